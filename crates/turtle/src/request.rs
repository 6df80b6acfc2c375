//! Prediction request types
//!
//! Requests are plain immutable data. Hashes are computed by
//! [`Model::hash_request`](crate::Model::hash_request), never cached on
//! these objects, so one request can be scored from many threads at once.

use serde::{Deserialize, Serialize};

/// Name of a feature: a string to hash, or a pre-assigned integer id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureName {
    Text(String),
    Id(u32),
}

impl From<&str> for FeatureName {
    fn from(name: &str) -> Self {
        FeatureName::Text(name.to_string())
    }
}

impl From<String> for FeatureName {
    fn from(name: String) -> Self {
        FeatureName::Text(name)
    }
}

impl From<u32> for FeatureName {
    fn from(id: u32) -> Self {
        FeatureName::Id(id)
    }
}

/// A single weighted signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: FeatureName,
    pub value: f32,
}

impl Feature {
    /// Feature named by a string
    pub fn text(name: impl Into<String>, value: f32) -> Self {
        Self {
            name: FeatureName::Text(name.into()),
            value,
        }
    }

    /// Feature named by a pre-assigned integer id
    pub fn id(id: u32, value: f32) -> Self {
        Self {
            name: FeatureName::Id(id),
            value,
        }
    }
}

/// A named group of features
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    /// Namespace name; empty means the default namespace
    #[serde(default)]
    pub name: String,
    pub features: Vec<Feature>,
}

impl Namespace {
    pub fn new(name: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            name: name.into(),
            features,
        }
    }

    /// Namespace without a name
    pub fn unnamed(features: Vec<Feature>) -> Self {
        Self::new(String::new(), features)
    }

    /// Interaction tag: the first byte of the name, `None` when unnamed.
    pub fn tag(&self) -> Option<u8> {
        self.name.as_bytes().first().copied()
    }
}

/// Input to one prediction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub namespaces: Vec<Namespace>,
    /// Apply the logistic transform (and class normalization) to the output
    #[serde(default)]
    pub probabilities: bool,
}

impl Request {
    pub fn new(namespaces: Vec<Namespace>) -> Self {
        Self {
            namespaces,
            probabilities: false,
        }
    }

    /// Builder-style switch for probability output
    pub fn with_probabilities(mut self, probabilities: bool) -> Self {
        self.probabilities = probabilities;
        self
    }

    /// Total number of features across all namespaces
    pub fn feature_count(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.features.len()).sum()
    }
}
