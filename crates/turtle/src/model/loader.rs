//! Streaming loader for readable model files
//!
//! The stream is read once, line by line. Lines before the `:0`
//! terminator form the header; every later line is an `index:value`
//! weight entry.

use super::header::{parse_number, Header};
use super::weights::WeightTable;
use super::Model;
use crate::config::{LoaderConfig, NumericParsing};
use crate::constants::HEADER_TERMINATOR;
use crate::errors::{Result, TurtleError};
use crate::hashing::FeatureHasher;
use std::io::{BufRead, BufReader, Read};
use tracing::{info, warn};

/// Read a model from `reader` using `config`.
pub fn load<R: Read>(reader: R, config: &LoaderConfig) -> Result<Model> {
    config.validate()?;

    let mode = config.numeric_parsing;
    let mut header = Header::new(mode);
    let mut table: Option<Vec<f32>> = None;

    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if let Some(weights) = table.as_mut() {
            read_weight(weights, &line, line_no, mode)?;
        } else if line == HEADER_TERMINATOR {
            table = Some(allocate(header.bits)?);
        } else {
            header.apply_line(&line, line_no)?;
        }
    }

    let weights = match table {
        Some(weights) => weights,
        None => allocate(header.bits)?,
    };
    let bits = header.bits.ok_or(TurtleError::MissingHeader("bits"))?;
    let mask = ((1u64 << bits) - 1) as u32;

    let non_zero = weights.iter().filter(|w| **w != 0.0).count();
    let weights = if config.sparse_policy.prefers_sparse(mask, non_zero) {
        WeightTable::sparse_from_dense(&weights)
    } else {
        WeightTable::Dense(weights)
    };

    info!(
        bits,
        classes = header.num_classes,
        storage = %weights.storage(),
        non_zero,
        interactions = header.interactions.len(),
        "Loaded readable model"
    );

    Ok(Model {
        weight_bits: bits,
        mask,
        weights,
        min_label: header.min_label,
        max_label: header.max_label,
        num_classes: header.num_classes,
        multi_class_bits: header.multi_class_bits,
        hasher: FeatureHasher::new(header.hash_seed, header.hash_all),
        interactions: header.interactions,
        metadata: header.metadata,
    })
}

fn allocate(bits: Option<u32>) -> Result<Vec<f32>> {
    let bits = bits.ok_or(TurtleError::MissingHeader("bits"))?;
    let slots = usize::try_from(1u64 << bits).map_err(|_| TurtleError::UnsupportedBits(bits))?;
    Ok(vec![0.0; slots])
}

fn read_weight(weights: &mut [f32], line: &str, line_no: usize, mode: NumericParsing) -> Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    let mut fields = line.split(':');
    let (index_token, value_token) = match (fields.next(), fields.next()) {
        (Some(index), Some(value)) => (index, value),
        _ => {
            return match mode {
                NumericParsing::Strict => Err(TurtleError::MalformedWeightLine {
                    line: line_no,
                    content: line.to_string(),
                }),
                NumericParsing::Lenient => {
                    warn!(line = line_no, content = line, "Skipping malformed weight entry");
                    Ok(())
                }
            };
        }
    };

    let index: u64 = parse_number(index_token, "weight index", line_no, mode)?;
    let value: f32 = parse_number(value_token, "weight value", line_no, mode)?;

    let size = weights.len() as u64;
    let slot = usize::try_from(index)
        .ok()
        .and_then(|i| weights.get_mut(i))
        .ok_or(TurtleError::IndexOutOfRange {
            line: line_no,
            index,
            size,
        })?;
    *slot = value;
    Ok(())
}
