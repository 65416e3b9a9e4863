//! Core rate limiter implementation

use super::types::{RateLimitBucket, RateLimitResult, RateLimiterConfig};
use dashmap::DashMap;
use std::time::Instant;
use tracing::debug;

/// Tolerance for float drift in refill arithmetic
const TOKEN_EPSILON: f64 = 1e-9;

/// Token bucket rate limiter keyed by caller identity
#[derive(Debug)]
pub struct RateLimiter {
    /// Rate limit configuration
    pub(super) config: RateLimiterConfig,
    /// Buckets by key (API key or IP)
    pub(super) buckets: DashMap<String, RateLimitBucket>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            buckets: DashMap::new(),
        }
    }

    /// Atomically refill, check and consume one token
    pub fn check_and_record(&self, key: &str) -> RateLimitResult {
        self.check_and_record_at(key, Instant::now())
    }

    /// [`check_and_record`](Self::check_and_record) as of `now`
    pub fn check_and_record_at(&self, key: &str, now: Instant) -> RateLimitResult {
        if !self.config.enabled {
            return self.unlimited();
        }

        let capacity = self.config.max_requests;
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| RateLimitBucket::full(capacity, now));

        self.refill(&mut bucket, now);

        let allowed = bucket.tokens + TOKEN_EPSILON >= 1.0;
        if allowed {
            bucket.tokens = (bucket.tokens - 1.0).max(0.0);
        } else {
            debug!(key = key, tokens = bucket.tokens, "Rate limit exceeded");
        }

        self.result(allowed, bucket.tokens)
    }

    /// Current state of a key's bucket without consuming a token
    pub fn peek_at(&self, key: &str, now: Instant) -> RateLimitResult {
        if !self.config.enabled {
            return self.unlimited();
        }

        let tokens = match self.buckets.get(key) {
            Some(bucket) => {
                let mut bucket = bucket.value().clone();
                self.refill(&mut bucket, now);
                bucket.tokens
            }
            None => self.config.max_requests as f64,
        };
        self.result(tokens + TOKEN_EPSILON >= 1.0, tokens)
    }

    /// Add tokens for the time elapsed since the last refill, capped at capacity
    fn refill(&self, bucket: &mut RateLimitBucket, now: Instant) {
        let capacity = self.config.max_requests as f64;
        let window = self.config.window.as_secs_f64();
        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();

        if window > 0.0 {
            bucket.tokens = (bucket.tokens + elapsed * capacity / window).min(capacity);
        } else {
            bucket.tokens = capacity;
        }
        bucket.last_refill = bucket.last_refill.max(now);
    }

    /// Seconds needed to accumulate `missing` tokens, rounded up
    fn secs_for(&self, missing: f64) -> u64 {
        let capacity = self.config.max_requests as f64;
        if missing <= TOKEN_EPSILON || capacity == 0.0 {
            return 0;
        }
        (missing * self.config.window.as_secs_f64() / capacity).ceil() as u64
    }

    fn result(&self, allowed: bool, tokens: f64) -> RateLimitResult {
        let capacity = self.config.max_requests;
        let reset_after_secs = self.secs_for(capacity as f64 - tokens);

        RateLimitResult {
            allowed,
            limit: capacity,
            remaining: (tokens + TOKEN_EPSILON).floor() as u32,
            reset_after_secs,
            reset_at: chrono::Utc::now().timestamp() + reset_after_secs as i64,
            retry_after_secs: if allowed {
                None
            } else {
                Some(self.secs_for(1.0 - tokens).max(1))
            },
        }
    }

    fn unlimited(&self) -> RateLimitResult {
        RateLimitResult {
            allowed: true,
            limit: self.config.max_requests,
            remaining: self.config.max_requests,
            reset_after_secs: 0,
            reset_at: chrono::Utc::now().timestamp(),
            retry_after_secs: None,
        }
    }
}
