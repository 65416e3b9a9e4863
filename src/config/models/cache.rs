//! Cache configuration

use super::*;
use crate::core::cache_manager::CacheConfig as CacheSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable caching
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cache TTL in milliseconds (`CACHE_TTL`)
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: u64,
    /// Maximum number of cached responses
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
    /// Expiry sweep period in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: default_cache_ttl_ms(),
            max_entries: default_cache_max_entries(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl CacheConfig {
    /// Runtime settings for the cache manager
    pub fn settings(&self) -> CacheSettings {
        CacheSettings {
            enabled: self.enabled && self.ttl_ms > 0,
            ttl: Duration::from_millis(self.ttl_ms),
            max_entries: self.max_entries,
            sweep_interval: Duration::from_secs(self.sweep_interval_secs.max(1)),
        }
    }
}
