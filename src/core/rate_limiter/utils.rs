//! Utility functions for rate limiter

use super::limiter::RateLimiter;
use super::types::RateLimitStatus;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::debug;

impl RateLimiter {
    /// Drop buckets idle for a full window; they would be full again anyway
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    /// [`cleanup`](Self::cleanup) as of `now`
    pub fn cleanup_at(&self, now: Instant) -> usize {
        let window = self.config.window;
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < window);
        let removed = before.saturating_sub(self.buckets.len());
        if removed > 0 {
            debug!(removed = removed, "Dropped idle rate limit buckets");
        }
        removed
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(self: Arc<Self>) -> JoinHandle<()> {
        let period = self.config.cleanup_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                self.cleanup();
            }
        })
    }

    /// Get current status for a key, `None` when limiting is disabled
    pub fn status(&self, key: &str) -> Option<RateLimitStatus> {
        if !self.config.enabled {
            return None;
        }

        Some(self.peek_at(key, Instant::now()).status())
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Get the configured capacity
    pub fn limit(&self) -> u32 {
        self.config.max_requests
    }

    /// Number of tracked buckets
    pub fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }
}
