//! Readable linear model
//!
//! A [`Model`] is built once from a text stream and is read-only
//! afterwards. It is `Send + Sync` and can be shared across threads.
//!
//! # Format
//!
//! ```text
//! Version 8.6.1
//! Min label:-1
//! Max label:1
//! bits:18
//! options: --hash_seed 0 --oaa 3 --quadratic ab
//! Checksum: 4199872739
//! :0
//! 47580:-0.274889
//! 47581:-0.27124
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use turtle::{Feature, Model, Namespace, Request};
//!
//! let file = std::fs::File::open("model.readable").unwrap();
//! let model = Model::load(file).unwrap();
//!
//! let request = Request::new(vec![Namespace::new(
//!     "user",
//!     vec![Feature::text("age_30", 1.0)],
//! )]);
//! let scores = model.predict(&request);
//! ```

pub mod header;
pub mod interactions;
pub mod loader;
pub mod weights;

pub use header::ModelMetadata;
pub use interactions::Interactions;
pub use weights::{StorageKind, WeightTable};

use crate::config::LoaderConfig;
use crate::errors::Result;
use crate::hashing::FeatureHasher;
use crate::predict::Link;
use std::io::Read;

/// Loaded feature-hashing linear model
#[derive(Debug, Clone)]
pub struct Model {
    weight_bits: u32,
    mask: u32,
    weights: WeightTable,
    min_label: f32,
    max_label: f32,
    num_classes: u32,
    multi_class_bits: u32,
    hasher: FeatureHasher,
    interactions: Interactions,
    metadata: ModelMetadata,
}

impl Model {
    /// Load a model with the default loader configuration
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        loader::load(reader, &LoaderConfig::default())
    }

    /// Load a model with an explicit loader configuration
    pub fn load_with_config<R: Read>(reader: R, config: &LoaderConfig) -> Result<Self> {
        loader::load(reader, config)
    }

    /// log2 of the table size
    pub fn weight_bits(&self) -> u32 {
        self.weight_bits
    }

    /// `(1 << weight_bits) - 1`
    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn min_label(&self) -> f32 {
        self.min_label
    }

    pub fn max_label(&self) -> f32 {
        self.max_label
    }

    /// Number of one-against-all output classes
    pub fn num_classes(&self) -> u32 {
        self.num_classes
    }

    /// Low bucket bits reserved for the class index
    pub fn multi_class_bits(&self) -> u32 {
        self.multi_class_bits
    }

    pub fn hash_seed(&self) -> u32 {
        self.hasher.seed()
    }

    pub fn hash_all(&self) -> bool {
        self.hasher.hash_all()
    }

    pub fn hasher(&self) -> FeatureHasher {
        self.hasher
    }

    pub fn interactions(&self) -> &Interactions {
        &self.interactions
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Link recorded in the header, if it names a known transform.
    ///
    /// Informational only: the transform applied at prediction time is
    /// selected by [`Request::probabilities`](crate::Request::probabilities).
    pub fn link(&self) -> Option<Link> {
        self.metadata.link.as_deref().and_then(Link::from_name)
    }
}
