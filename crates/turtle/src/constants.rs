//! Format constants shared by the loader and the prediction engine.
//!
//! These values are fixed by the training tool that writes the model;
//! changing any of them silently changes every score.

/// Reserved hash whose buckets hold the per-class intercept weights.
pub const INTERCEPT_HASH: u32 = 11_650_396;

/// 32-bit FNV prime used to mix two feature hashes into an interaction hash.
pub const FNV_PRIME: u32 = 16_777_619;

/// Line that terminates the header and starts the weight table.
pub const HEADER_TERMINATOR: &str = ":0";

/// Default divisor of the sparse storage heuristic (`non_zero < mask / 8`).
pub const DEFAULT_SPARSE_DIVISOR: u32 = 8;

/// Largest `bits:` value the loader accepts; buckets are 32-bit.
pub const MAX_WEIGHT_BITS: u32 = 32;
