//! Rate limiter types and data structures

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Token bucket settings
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimiterConfig {
    /// Disabled limiters admit everything
    pub enabled: bool,
    /// Bucket capacity
    pub max_requests: u32,
    /// Time for an empty bucket to refill completely
    pub window: Duration,
    /// How often idle buckets are dropped
    pub cleanup_interval: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window: Duration::from_secs(60),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

/// Rate limit result
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Bucket capacity
    pub limit: u32,
    /// Whole tokens left after this request
    pub remaining: u32,
    /// Seconds until the bucket is full again
    pub reset_after_secs: u64,
    /// Unix timestamp at which the bucket is full again
    pub reset_at: i64,
    /// Retry after (in seconds, only set when not allowed)
    pub retry_after_secs: Option<u64>,
}

impl RateLimitResult {
    /// Header-facing view of the result
    pub fn status(&self) -> RateLimitStatus {
        RateLimitStatus {
            limit: self.limit,
            remaining: self.remaining,
            reset_at: self.reset_at,
        }
    }
}

/// Limit, remaining tokens and reset time for one caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    /// Unix timestamp at which the bucket is full again
    pub reset_at: i64,
}

/// Token bucket for one caller key
#[derive(Debug, Clone)]
pub(super) struct RateLimitBucket {
    /// Tokens currently available (fractional)
    pub(super) tokens: f64,
    /// Last token refill time
    pub(super) last_refill: Instant,
}

impl RateLimitBucket {
    pub(super) fn full(capacity: u32, now: Instant) -> Self {
        Self {
            tokens: capacity as f64,
            last_refill: now,
        }
    }
}
