//! Fallback chain and execution result types

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// Execution result with metadata
///
/// Carries the successful value together with where and how it was obtained.
#[derive(Debug)]
pub struct ExecutionResult<T> {
    /// The successful result value
    pub result: T,
    /// Target model that produced the result
    pub model_used: String,
    /// Provider that served it
    pub provider: String,
    /// Total upstream calls across all retries and fallbacks
    pub attempts: u32,
    /// Whether a fallback model served the request
    pub used_fallback: bool,
    /// Models that were exhausted before the serving one
    pub tried_models: Vec<String>,
    /// Total execution latency in microseconds (including backoff)
    pub latency_us: u64,
}

/// Target model → next target model after retry exhaustion
///
/// The chain may contain cycles; the executor's tried-model set breaks them.
#[derive(Debug, Default)]
pub struct FallbackChain {
    links: RwLock<HashMap<String, String>>,
}

impl FallbackChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from configured links
    pub fn from_links(links: HashMap<String, String>) -> Self {
        Self {
            links: RwLock::new(links),
        }
    }

    /// Add fallback for a model (builder pattern)
    pub fn with(self, model: &str, fallback: &str) -> Self {
        self.set(model, fallback);
        self
    }

    /// Set the fallback for a model, returning the previous one
    pub fn set(&self, model: &str, fallback: &str) -> Option<String> {
        self.links
            .write()
            .insert(model.to_string(), fallback.to_string())
    }

    /// Remove the fallback for a model
    pub fn remove(&self, model: &str) -> Option<String> {
        self.links.write().remove(model)
    }

    /// Next model to try after `model`
    pub fn next(&self, model: &str) -> Option<String> {
        self.links.read().get(model).cloned()
    }

    /// Snapshot of all links, sorted by model
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.links
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
