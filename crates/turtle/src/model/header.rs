//! Header parsing for the readable model format
//!
//! Header lines are recognized by prefix; anything else is skipped. The
//! `options:` line is a whitespace separated list of `--flag value` pairs of
//! which only the flags affecting scoring are interpreted.

use super::interactions::Interactions;
use crate::config::NumericParsing;
use crate::constants::MAX_WEIGHT_BITS;
use crate::errors::{Result, TurtleError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

/// Informational header fields; never used for scoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Format version written by the training tool (`Version 8.6.1`)
    pub version: Option<String>,
    /// Model id (`Id <name>`), absent when blank
    pub id: Option<String>,
    /// Checksum recorded by the training tool
    pub checksum: Option<u32>,
    /// Value of the `--link` option
    pub link: Option<String>,
}

/// Hyperparameters collected while reading the header
#[derive(Debug, Clone)]
pub(crate) struct Header {
    pub bits: Option<u32>,
    pub min_label: f32,
    pub max_label: f32,
    pub num_classes: u32,
    pub multi_class_bits: u32,
    pub hash_seed: u32,
    pub hash_all: bool,
    pub interactions: Interactions,
    pub metadata: ModelMetadata,
    mode: NumericParsing,
}

/// Parse a numeric token, degrading to zero in lenient mode.
pub(crate) fn parse_number<T>(
    token: &str,
    field: &'static str,
    line: usize,
    mode: NumericParsing,
) -> Result<T>
where
    T: FromStr + Default,
{
    let token = token.trim();
    match token.parse::<T>() {
        Ok(value) => Ok(value),
        Err(_) => match mode {
            NumericParsing::Strict => Err(TurtleError::MalformedNumber {
                line,
                field,
                token: token.to_string(),
            }),
            NumericParsing::Lenient => {
                warn!(line, field, token, "Malformed number, using zero");
                Ok(T::default())
            }
        },
    }
}

/// Field between the first and second `:` of a header line
fn field_value(line: &str) -> &str {
    line.split(':').nth(1).unwrap_or("")
}

impl Header {
    pub fn new(mode: NumericParsing) -> Self {
        Self {
            bits: None,
            min_label: 0.0,
            max_label: 0.0,
            num_classes: 1,
            multi_class_bits: 0,
            hash_seed: 0,
            hash_all: false,
            interactions: Interactions::new(),
            metadata: ModelMetadata::default(),
            mode,
        }
    }

    /// Fold one header line into the collected hyperparameters
    pub fn apply_line(&mut self, line: &str, line_no: usize) -> Result<()> {
        if line.starts_with("bits:") {
            let bits: u32 = parse_number(field_value(line), "bits", line_no, self.mode)?;
            if bits > MAX_WEIGHT_BITS {
                return Err(TurtleError::UnsupportedBits(bits));
            }
            self.bits = Some(bits);
        } else if line.starts_with("Min label") {
            self.min_label = parse_number(field_value(line), "Min label", line_no, self.mode)?;
        } else if line.starts_with("Max label") {
            self.max_label = parse_number(field_value(line), "Max label", line_no, self.mode)?;
        } else if let Some(options) = line.strip_prefix("options:") {
            self.apply_options(options, line_no)?;
        } else if let Some(version) = line.strip_prefix("Version ") {
            self.metadata.version = Some(version.trim().to_string());
        } else if let Some(id) = line.strip_prefix("Id ") {
            let id = id.trim();
            self.metadata.id = (!id.is_empty()).then(|| id.to_string());
        } else if line.starts_with("Checksum:") {
            self.metadata.checksum = field_value(line).trim().parse().ok();
        }
        Ok(())
    }

    fn apply_options(&mut self, options: &str, line_no: usize) -> Result<()> {
        let tokens: Vec<&str> = options.split_whitespace().collect();
        for pair in tokens.chunks(2) {
            match pair {
                [flag, value] => self.apply_option(flag, value, line_no)?,
                [flag] => warn!(line = line_no, flag, "Option without value ignored"),
                _ => {}
            }
        }
        Ok(())
    }

    fn apply_option(&mut self, flag: &str, value: &str, line_no: usize) -> Result<()> {
        match flag {
            "--oaa" => {
                let classes: u32 = parse_number(value, "--oaa", line_no, self.mode)?;
                if classes == 0 {
                    return Err(TurtleError::InvalidOption {
                        flag: flag.to_string(),
                        value: value.to_string(),
                        reason: "at least one class is required",
                    });
                }
                self.num_classes = classes;
                // bits needed to represent 0..=classes
                self.multi_class_bits = u32::BITS - classes.leading_zeros();
            }
            "--quadratic" => match value.as_bytes() {
                [left, right, ..] => self.interactions.declare(*left, *right),
                _ => {
                    return Err(TurtleError::InvalidOption {
                        flag: flag.to_string(),
                        value: value.to_string(),
                        reason: "expected two namespace characters",
                    })
                }
            },
            "--hash_seed" => {
                self.hash_seed = parse_number(value, "--hash_seed", line_no, self.mode)?;
            }
            "--hash" => {
                if value == "all" {
                    self.hash_all = true;
                }
            }
            "--link" => self.metadata.link = Some(value.to_string()),
            _ => debug!(flag, value, "Ignoring option"),
        }
        Ok(())
    }
}
