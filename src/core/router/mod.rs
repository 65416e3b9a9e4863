//! Retry-with-fallback executor
//!
//! Runs one logical request against its target model with bounded retries and
//! exponential backoff, then walks the fallback chain. No target model is
//! attempted twice for the same request, even when the chain is cyclic.

pub mod config;
pub mod execute_impl;
pub mod execution;
pub mod fallback;


pub use config::RetryPolicy;
pub use execution::{calculate_retry_delay, is_retryable_error};
pub use fallback::{ExecutionResult, FallbackChain};

use crate::core::providers::ProviderRegistry;
use std::sync::Arc;

/// Executor over the provider registry and the fallback chain
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<ProviderRegistry>,
    fallbacks: Arc<FallbackChain>,
    policy: RetryPolicy,
}

impl Router {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        fallbacks: Arc<FallbackChain>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            registry,
            fallbacks,
            policy,
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn fallbacks(&self) -> &Arc<FallbackChain> {
        &self.fallbacks
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}
