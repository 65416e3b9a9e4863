//! Retry and fallback configuration

use super::*;
use crate::core::router::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Executor retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Upstream attempts per target model (`MAX_RETRIES`)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff in milliseconds (`RETRY_DELAY`)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Cap on a single backoff wait in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Spread backoff waits by ±10%
    #[serde(default)]
    pub jitter: bool,
    /// Upstream request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: false,
            timeout_secs: default_timeout(),
        }
    }
}

impl RouterConfig {
    /// Executor policy for these settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay_ms)
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_jitter(self.jitter)
    }
}
