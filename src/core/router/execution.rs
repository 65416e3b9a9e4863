//! Backoff helpers for the executor

use super::config::RetryPolicy;
use crate::core::providers::ProviderError;
use std::time::Duration;

/// Check if an error may consume retry budget and trigger fallback
pub fn is_retryable_error(error: &ProviderError) -> bool {
    error.is_retryable()
}

/// Calculate retry delay using exponential backoff
///
/// The formula is `retry_delay * 2^(retry_count - 1)`, optionally spread by
/// ±10% jitter, capped at `max_delay`.
pub fn calculate_retry_delay(policy: &RetryPolicy, retry_count: u32) -> Duration {
    let base_delay = policy.retry_delay.as_millis() as f64;
    let exponent = retry_count.saturating_sub(1).min(31) as i32;
    let exponential_delay = base_delay * 2_f64.powi(exponent);

    let delay_ms = if policy.jitter {
        let jitter_factor = 0.1;
        let jitter = exponential_delay * jitter_factor * (rand::random::<f64>() - 0.5) * 2.0;
        exponential_delay + jitter
    } else {
        exponential_delay
    };

    let capped_delay = delay_ms.min(policy.max_delay.as_millis() as f64).max(0.0);
    Duration::from_millis(capped_delay as u64)
}
