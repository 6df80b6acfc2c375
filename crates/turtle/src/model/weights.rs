//! Weight table storage
//!
//! One logical table of `1 << bits` slots, held either as a dense array or
//! as a map of the non-zero slots. Lookups are identical in both forms.

use std::collections::HashMap;
use std::fmt;

/// Storage representation selected at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Dense,
    Sparse,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Dense => f.write_str("dense"),
            StorageKind::Sparse => f.write_str("sparse"),
        }
    }
}

/// Model weights indexed by bucket
#[derive(Clone, PartialEq)]
pub enum WeightTable {
    Dense(Vec<f32>),
    Sparse {
        slots: u64,
        weights: HashMap<u32, f32>,
    },
}

impl WeightTable {
    /// Sparse copy of a dense array, keeping only non-zero slots.
    pub fn sparse_from_dense(dense: &[f32]) -> Self {
        let weights = dense
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0.0)
            .map(|(i, w)| (i as u32, *w))
            .collect();
        WeightTable::Sparse {
            slots: dense.len() as u64,
            weights,
        }
    }

    /// Weight stored at `bucket`.
    ///
    /// Buckets are masked by the caller; a missing sparse slot reads as 0.
    #[inline]
    pub fn get(&self, bucket: u32) -> f32 {
        match self {
            WeightTable::Dense(weights) => weights[bucket as usize],
            WeightTable::Sparse { weights, .. } => weights.get(&bucket).copied().unwrap_or(0.0),
        }
    }

    /// Number of addressable slots
    pub fn len(&self) -> u64 {
        match self {
            WeightTable::Dense(weights) => weights.len() as u64,
            WeightTable::Sparse { slots, .. } => *slots,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots holding a non-zero weight
    pub fn non_zero(&self) -> usize {
        match self {
            WeightTable::Dense(weights) => weights.iter().filter(|w| **w != 0.0).count(),
            WeightTable::Sparse { weights, .. } => weights.values().filter(|w| **w != 0.0).count(),
        }
    }

    pub fn storage(&self) -> StorageKind {
        match self {
            WeightTable::Dense(_) => StorageKind::Dense,
            WeightTable::Sparse { .. } => StorageKind::Sparse,
        }
    }

    pub fn is_sparse(&self) -> bool {
        self.storage() == StorageKind::Sparse
    }
}

impl fmt::Debug for WeightTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightTable")
            .field("storage", &self.storage())
            .field("slots", &self.len())
            .field("non_zero", &self.non_zero())
            .finish()
    }
}
