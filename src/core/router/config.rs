//! Retry policy for the executor

use std::time::Duration;

/// Retry and backoff settings
///
/// ## Defaults
///
/// - `max_retries`: 3 attempts per target model
/// - `retry_delay`: 1000 ms, doubled after each failed attempt
/// - `max_delay`: 30 s cap on a single wait
/// - `jitter`: off
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Upstream attempts allowed per target model
    pub max_retries: u32,
    /// Wait before the first retry
    pub retry_delay: Duration,
    /// Upper bound on a single wait
    pub max_delay: Duration,
    /// Spread waits by ±10%
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_retries` attempts and `retry_delay_ms` base delay
    pub fn new(max_retries: u32, retry_delay_ms: u64) -> Self {
        Self {
            max_retries: max_retries.max(1),
            retry_delay: Duration::from_millis(retry_delay_ms),
            ..Self::default()
        }
    }

    /// Builder: enable jitter
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Builder: cap a single wait
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }
}
