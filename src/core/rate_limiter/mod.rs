//! Rate Limiting Implementation
//!
//! Token bucket per caller key: capacity `max_requests`, refilled continuously
//! so that an empty bucket is full again after `window`.

mod limiter;
mod types;
mod utils;


// Re-export public types
pub use limiter::RateLimiter;
pub use types::{RateLimitResult, RateLimitStatus, RateLimiterConfig};
