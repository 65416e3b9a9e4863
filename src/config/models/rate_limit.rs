//! Rate limiting configuration

use super::*;
use crate::core::rate_limiter::RateLimiterConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Full refill time in milliseconds (`RATE_LIMIT_WINDOW`)
    #[serde(default = "default_rate_limit_window_ms")]
    pub window_ms: u64,
    /// Bucket capacity (`RATE_LIMIT_MAX_REQUESTS`)
    #[serde(default = "default_rate_limit_max_requests")]
    pub max_requests: u32,
    /// Idle bucket cleanup period in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_ms: default_rate_limit_window_ms(),
            max_requests: default_rate_limit_max_requests(),
            cleanup_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl RateLimitConfig {
    /// Runtime settings for the limiter
    pub fn settings(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            enabled: self.enabled,
            max_requests: self.max_requests,
            window: Duration::from_millis(self.window_ms),
            cleanup_interval: Duration::from_secs(self.cleanup_interval_secs.max(1)),
        }
    }
}
