//! Loader configuration
//!
//! Configuration can be built in code, read from a TOML file, and
//! overridden through `TURTLE_*` environment variables:
//!
//! ```toml
//! numeric_parsing = "strict"
//!
//! [sparse_policy]
//! mode = "auto"
//! divisor = 8
//! ```

use crate::constants::DEFAULT_SPARSE_DIVISOR;
use crate::errors::{Result, TurtleError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Environment variable selecting the storage policy (`auto`, `dense`, `sparse`)
pub const ENV_SPARSE_POLICY: &str = "TURTLE_SPARSE_POLICY";
/// Environment variable overriding the auto policy divisor
pub const ENV_SPARSE_DIVISOR: &str = "TURTLE_SPARSE_DIVISOR";
/// Environment variable selecting numeric parsing (`strict`, `lenient`)
pub const ENV_NUMERIC_PARSING: &str = "TURTLE_NUMERIC_PARSING";

/// How the weight table is stored once the body has been read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SparsePolicy {
    /// Sparse when fewer than `mask / divisor` slots are non-zero
    Auto { divisor: u32 },
    /// Always keep the dense array
    Dense,
    /// Always convert to a sparse map
    Sparse,
}

impl SparsePolicy {
    /// Decide the representation for a table with the given mask and
    /// non-zero slot count.
    pub fn prefers_sparse(&self, mask: u32, non_zero: usize) -> bool {
        match *self {
            SparsePolicy::Auto { divisor } => {
                divisor != 0 && (non_zero as u64) < u64::from(mask / divisor)
            }
            SparsePolicy::Dense => false,
            SparsePolicy::Sparse => true,
        }
    }
}

impl Default for SparsePolicy {
    fn default() -> Self {
        SparsePolicy::Auto {
            divisor: DEFAULT_SPARSE_DIVISOR,
        }
    }
}

/// Treatment of recognized numeric fields that fail to parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericParsing {
    /// Abort the load with [`TurtleError::MalformedNumber`]
    #[default]
    Strict,
    /// Substitute zero and log a warning
    Lenient,
}

/// Model loader configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Dense/sparse storage selection
    pub sparse_policy: SparsePolicy,
    /// Numeric parsing mode
    pub numeric_parsing: NumericParsing,
}

impl LoaderConfig {
    /// Configuration that keeps the dense array regardless of density
    pub fn dense() -> Self {
        Self {
            sparse_policy: SparsePolicy::Dense,
            ..Self::default()
        }
    }

    /// Configuration that always converts to sparse storage
    pub fn sparse() -> Self {
        Self {
            sparse_policy: SparsePolicy::Sparse,
            ..Self::default()
        }
    }

    /// Configuration that substitutes zero for malformed numbers
    pub fn lenient() -> Self {
        Self {
            numeric_parsing: NumericParsing::Lenient,
            ..Self::default()
        }
    }

    /// Check the configuration for values the loader cannot use
    pub fn validate(&self) -> Result<()> {
        if let SparsePolicy::Auto { divisor: 0 } = self.sparse_policy {
            return Err(TurtleError::InvalidConfig(
                "sparse divisor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LoaderConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading loader configuration from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply `TURTLE_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unrecognized values are logged and leave the current setting in place.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_SPARSE_POLICY) {
            match val.trim().to_ascii_lowercase().as_str() {
                "auto" => {
                    if !matches!(self.sparse_policy, SparsePolicy::Auto { .. }) {
                        self.sparse_policy = SparsePolicy::default();
                    }
                }
                "dense" => self.sparse_policy = SparsePolicy::Dense,
                "sparse" => self.sparse_policy = SparsePolicy::Sparse,
                other => warn!("Ignoring {}={:?}", ENV_SPARSE_POLICY, other),
            }
        }

        if let Some(val) = lookup(ENV_SPARSE_DIVISOR) {
            match val.trim().parse::<u32>() {
                Ok(divisor) => self.sparse_policy = SparsePolicy::Auto { divisor },
                Err(_) => warn!("Ignoring {}={:?}", ENV_SPARSE_DIVISOR, val),
            }
        }

        if let Some(val) = lookup(ENV_NUMERIC_PARSING) {
            match val.trim().to_ascii_lowercase().as_str() {
                "strict" => self.numeric_parsing = NumericParsing::Strict,
                "lenient" => self.numeric_parsing = NumericParsing::Lenient,
                other => warn!("Ignoring {}={:?}", ENV_NUMERIC_PARSING, other),
            }
        }

        self.validate()
    }
}
