//! Prediction engine
//!
//! Scoring runs in two passes. [`Model::hash_request`] hashes every
//! namespace and feature name once, producing an immutable
//! [`HashedRequest`]. The scoring pass then accumulates, per class:
//!
//! 1. `value * w[bucket(feature, k)]` for every feature
//! 2. `a.value * b.value * w[bucket(a.hash * FNV ^ b.hash, k)]` for every
//!    declared interaction pair of namespaces
//! 3. the intercept weight, followed by clipping to `[min_label, max_label]`
//! 4. optionally the logistic transform, normalized across classes when
//!    there is more than one
//!
//! All arithmetic is `f32` in exactly this order so scores match the
//! training tool bit for bit.

use crate::constants::INTERCEPT_HASH;
use crate::errors::{Result, TurtleError};
use crate::hashing::{bucket, interaction_hash, FeatureHasher};
use crate::model::Model;
use crate::request::Request;
use rayon::prelude::*;

/// Output transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Identity,
    Logistic,
}

impl Link {
    /// Resolve a `--link` option value
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "identity" => Some(Link::Identity),
            "logistic" => Some(Link::Logistic),
            _ => None,
        }
    }

    pub fn apply(self, x: f32) -> f32 {
        match self {
            Link::Identity => identity(x),
            Link::Logistic => logistic(x),
        }
    }
}

pub fn identity(x: f32) -> f32 {
    x
}

/// `1 / (1 + e^-x)`, evaluated in `f64`.
pub fn logistic(x: f32) -> f32 {
    (1.0 / (1.0 + f64::from(-x).exp())) as f32
}

/// Clamp `x` into `[min, max]`.
///
/// A NaN score (from NaN weights or feature values) clamps to `max`, so the
/// class reports `max_label` and, with probabilities on, a finite
/// probability. No error is raised.
#[inline]
pub fn clip(x: f32, min: f32, max: f32) -> f32 {
    x.min(max).max(min)
}

/// A feature with its hash resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashedFeature {
    pub hash: u32,
    pub value: f32,
}

/// A namespace with its hash and interaction tag resolved
#[derive(Debug, Clone, PartialEq)]
pub struct HashedNamespace {
    pub tag: Option<u8>,
    pub hash: u32,
    pub features: Vec<HashedFeature>,
}

/// Request with every hash precomputed for one hashing scheme
#[derive(Debug, Clone, PartialEq)]
pub struct HashedRequest {
    hasher: FeatureHasher,
    namespaces: Vec<HashedNamespace>,
    probabilities: bool,
}

impl HashedRequest {
    pub fn hasher(&self) -> FeatureHasher {
        self.hasher
    }

    pub fn namespaces(&self) -> &[HashedNamespace] {
        &self.namespaces
    }

    pub fn probabilities(&self) -> bool {
        self.probabilities
    }
}

impl FeatureHasher {
    /// Hash every name in `request`.
    pub fn hash_request(&self, request: &Request) -> HashedRequest {
        let namespaces = request
            .namespaces
            .iter()
            .map(|ns| {
                let hash = self.namespace_hash(&ns.name);
                HashedNamespace {
                    tag: ns.tag(),
                    hash,
                    features: ns
                        .features
                        .iter()
                        .map(|f| HashedFeature {
                            hash: self.feature_hash(&f.name, hash),
                            value: f.value,
                        })
                        .collect(),
                }
            })
            .collect();

        HashedRequest {
            hasher: *self,
            namespaces,
            probabilities: request.probabilities,
        }
    }
}

impl Model {
    /// Precompute the hashes of `request` for this model.
    pub fn hash_request(&self, request: &Request) -> HashedRequest {
        self.hasher().hash_request(request)
    }

    /// Score a request, one value per class.
    pub fn predict(&self, request: &Request) -> Vec<f32> {
        self.score(&self.hash_request(request))
    }

    /// Score a request hashed earlier with [`Model::hash_request`].
    pub fn predict_hashed(&self, request: &HashedRequest) -> Result<Vec<f32>> {
        if request.hasher != self.hasher() {
            return Err(TurtleError::HasherMismatch);
        }
        Ok(self.score(request))
    }

    /// Score independent requests in parallel; output order follows input.
    pub fn predict_batch(&self, requests: &[Request]) -> Vec<Vec<f32>> {
        requests.par_iter().map(|req| self.predict(req)).collect()
    }

    /// Table slot of `hash` for class `class`
    #[inline]
    pub fn bucket(&self, hash: u32, class: u32) -> u32 {
        bucket(hash, class, self.multi_class_bits(), self.mask())
    }

    fn score(&self, request: &HashedRequest) -> Vec<f32> {
        let mut out = vec![0.0f32; self.num_classes() as usize];

        for ns in &request.namespaces {
            for feature in &ns.features {
                self.accumulate(&mut out, feature.hash, feature.value);
            }
        }

        if !self.interactions().is_empty() {
            self.accumulate_interactions(&mut out, &request.namespaces);
        }

        let (min, max) = (self.min_label(), self.max_label());
        for (class, score) in out.iter_mut().enumerate() {
            *score += self.weights().get(self.bucket(INTERCEPT_HASH, class as u32));
            *score = clip(*score, min, max);
        }

        if request.probabilities {
            to_probabilities(&mut out);
        }
        out
    }

    #[inline]
    fn accumulate(&self, out: &mut [f32], hash: u32, value: f32) {
        for (class, score) in out.iter_mut().enumerate() {
            *score += value * self.weights().get(self.bucket(hash, class as u32));
        }
    }

    fn accumulate_interactions(&self, out: &mut [f32], namespaces: &[HashedNamespace]) {
        for (left, partners) in self.interactions().iter() {
            for ns_a in namespaces.iter().filter(|ns| ns.tag == Some(left)) {
                for &right in partners {
                    for ns_b in namespaces.iter().filter(|ns| ns.tag == Some(right)) {
                        for a in &ns_a.features {
                            for b in &ns_b.features {
                                self.accumulate(out, interaction_hash(a.hash, b.hash), a.value * b.value);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Logistic per class, then divide by the class sum when multi-class.
fn to_probabilities(out: &mut [f32]) {
    for score in out.iter_mut() {
        *score = Link::Logistic.apply(*score);
    }
    if out.len() > 1 {
        let sum = out.iter().fold(0.0f32, |acc, p| acc + p);
        for score in out.iter_mut() {
            *score /= sum;
        }
    }
}
