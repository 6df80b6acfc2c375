//! Error types for the turtle crate

use thiserror::Error;

/// Errors raised while loading a model or replaying a hashed request
#[derive(Error, Debug)]
pub enum TurtleError {
    /// The underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A recognized numeric field could not be parsed
    #[error("line {line}: malformed {field} value {token:?}")]
    MalformedNumber {
        line: usize,
        field: &'static str,
        token: String,
    },

    /// A weight table line is not of the form `index:value`
    #[error("line {line}: malformed weight entry {content:?}")]
    MalformedWeightLine { line: usize, content: String },

    /// A weight index does not address a slot of the table
    #[error("line {line}: weight index {index} outside table of {size} slots")]
    IndexOutOfRange { line: usize, index: u64, size: u64 },

    /// A required header field never appeared
    #[error("missing header field: {0}")]
    MissingHeader(&'static str),

    /// The table width is not representable with 32-bit buckets
    #[error("unsupported weight bits: {0}")]
    UnsupportedBits(u32),

    /// An `options:` flag carried a value this loader cannot honor
    #[error("invalid option {flag} {value:?}: {reason}")]
    InvalidOption {
        flag: String,
        value: String,
        reason: &'static str,
    },

    /// Loader configuration is inconsistent
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be decoded
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A hashed request was computed for a different hashing scheme
    #[error("hashed request was built with a different feature hasher")]
    HasherMismatch,
}

/// Result type for turtle operations
pub type Result<T> = std::result::Result<T, TurtleError>;
