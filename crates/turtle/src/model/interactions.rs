//! Declared quadratic interactions
//!
//! A declaration `--quadratic XY` pairs every namespace tagged `X` with
//! every namespace tagged `Y`, where a namespace's tag is the first byte of
//! its name. Pairs are directional: `ab` does not imply `ba`. Declaring a
//! pair twice scores it twice.

use std::collections::BTreeMap;

/// Ordered tag pairs, grouped by left tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interactions {
    partners: BTreeMap<u8, Vec<u8>>,
}

impl Interactions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `left -> right`
    pub fn declare(&mut self, left: u8, right: u8) {
        self.partners.entry(left).or_default().push(right);
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Number of declared pairs, duplicates included
    pub fn len(&self) -> usize {
        self.partners.values().map(Vec::len).sum()
    }

    /// Right-hand tags declared for `left`, in declaration order
    pub fn partners(&self, left: u8) -> &[u8] {
        self.partners.get(&left).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, left: u8, right: u8) -> bool {
        self.partners(left).contains(&right)
    }

    /// Left tags in ascending order with their partners
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[u8])> + '_ {
        self.partners
            .iter()
            .map(|(left, rights)| (*left, rights.as_slice()))
    }
}
