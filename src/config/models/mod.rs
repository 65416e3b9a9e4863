//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

#![allow(missing_docs)]

pub mod cache;
pub mod gateway;
pub mod logging;
pub mod provider;
pub mod rate_limit;
pub mod router;
pub mod server;

// Re-export all configuration types
pub use cache::*;
pub use gateway::*;
pub use logging::*;
pub use provider::*;
pub use rate_limit::*;
pub use router::*;
pub use server::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default upstream request timeout in seconds
pub fn default_timeout() -> u64 {
    120
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

/// Default attempts per target model
pub fn default_max_retries() -> u32 {
    3
}

/// Default base backoff in milliseconds
pub fn default_retry_delay_ms() -> u64 {
    1000
}

pub fn default_max_delay_ms() -> u64 {
    30_000
}

pub fn default_cache_ttl_ms() -> u64 {
    3_600_000 // 1 hour
}

pub fn default_cache_max_entries() -> usize {
    10_000
}

pub fn default_sweep_interval_secs() -> u64 {
    60
}

pub fn default_rate_limit_window_ms() -> u64 {
    60_000
}

pub fn default_rate_limit_max_requests() -> u32 {
    100
}

/// Default CORS preflight max age in seconds
pub fn default_cors_max_age() -> usize {
    3600
}

pub fn default_api_key_header() -> String {
    "Authorization".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}
