//! Readable linear model scoring
//!
//! Loads feature-hashing linear models written in the readable text format
//! of the training tool and reproduces its predictions exactly: the same
//! murmur hashing chain, bucket layout, one-against-all class packing,
//! quadratic interactions, clipping and output transform.
//!
//! Modules:
//! - `model`: Model type, weight storage and the streaming loader
//! - `predict`: Hashing pre-pass and the scoring engine
//! - `request`: Request, namespace and feature builders
//! - `hashing`: Murmur hashing, interaction mixing and bucket math
//! - `config`: Loader configuration (storage policy, numeric parsing)
//! - `constants`: Format constants
//! - `errors`: Error type

pub mod config;
pub mod constants;
pub mod errors;
pub mod hashing;
pub mod model;
pub mod predict;
pub mod request;

pub use config::{LoaderConfig, NumericParsing, SparsePolicy};
pub use errors::{Result, TurtleError};
pub use hashing::FeatureHasher;
pub use model::{Interactions, Model, ModelMetadata, StorageKind, WeightTable};
pub use predict::{clip, identity, logistic, HashedFeature, HashedNamespace, HashedRequest, Link};
pub use request::{Feature, FeatureName, Namespace, Request};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
