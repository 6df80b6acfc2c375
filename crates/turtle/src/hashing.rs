//! Feature hashing and bucket math
//!
//! Names are hashed with the 32-bit x86 variant of MurmurHash3. The seed
//! chain is: model seed -> namespace hash -> feature hash. Interaction
//! hashes and bucket indices are plain wrapping 32-bit arithmetic.

use crate::constants::FNV_PRIME;
use crate::request::FeatureName;
use std::io::Cursor;

/// Seeded MurmurHash3 (x86, 32-bit) of a byte string.
pub fn murmur3_32(bytes: &[u8], seed: u32) -> u32 {
    // reads from an in-memory cursor never fail
    murmur3::murmur3_32(&mut Cursor::new(bytes), seed).unwrap_or_default()
}

/// Mix two feature hashes into the hash of their quadratic interaction.
#[inline]
pub fn interaction_hash(left: u32, right: u32) -> u32 {
    left.wrapping_mul(FNV_PRIME) ^ right
}

/// Table slot of `hash` for output class `class`.
///
/// The class index occupies the low `class_bits` bits. Shifting by 32 or
/// more bits drops the hash entirely.
#[inline]
pub fn bucket(hash: u32, class: u32, class_bits: u32, mask: u32) -> u32 {
    (hash.checked_shl(class_bits).unwrap_or(0) | class) & mask
}

/// Hashing scheme of a loaded model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeatureHasher {
    seed: u32,
    hash_all: bool,
}

impl FeatureHasher {
    /// Create a hasher for the given model seed and `--hash all` mode
    pub fn new(seed: u32, hash_all: bool) -> Self {
        Self { seed, hash_all }
    }

    /// Model-level hash seed
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Whether integer feature ids are hashed as decimal strings
    pub fn hash_all(&self) -> bool {
        self.hash_all
    }

    /// Hash of a namespace name; the unnamed namespace hashes to 0.
    pub fn namespace_hash(&self, name: &str) -> u32 {
        if name.is_empty() {
            0
        } else {
            murmur3_32(name.as_bytes(), self.seed)
        }
    }

    /// Hash of a feature inside a namespace with hash `namespace_hash`.
    ///
    /// An empty text name is scored as integer id 0.
    pub fn feature_hash(&self, name: &FeatureName, namespace_hash: u32) -> u32 {
        match name {
            FeatureName::Text(text) if !text.is_empty() => {
                murmur3_32(text.as_bytes(), namespace_hash)
            }
            FeatureName::Text(_) => self.id_hash(0, namespace_hash),
            FeatureName::Id(id) => self.id_hash(*id, namespace_hash),
        }
    }

    fn id_hash(&self, id: u32, namespace_hash: u32) -> u32 {
        if self.hash_all {
            murmur3_32(id.to_string().as_bytes(), namespace_hash)
        } else {
            // pre-hashed ids are offset by the namespace, not rehashed
            id.wrapping_add(namespace_hash)
        }
    }
}
