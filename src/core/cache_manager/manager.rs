//! Cache manager implementation
//!
//! A sharded TTL map of normalized responses. Clearing bumps a generation
//! counter before dropping entries, so a reader that starts after the clear
//! never sees an entry written before it.

use super::types::{AtomicCacheStats, CacheConfig, CacheEntry, CacheKey, CacheStats};
use crate::core::types::NormalizedResponse;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// TTL response cache
#[derive(Debug)]
pub struct CacheManager {
    entries: DashMap<CacheKey, CacheEntry<NormalizedResponse>>,
    generation: AtomicU64,
    config: CacheConfig,
    /// Cache statistics (lock-free atomics for hot path)
    stats: AtomicCacheStats,
}

impl CacheManager {
    /// Create a new cache manager
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            config,
            stats: AtomicCacheStats::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a cached response
    pub fn get(&self, key: &CacheKey) -> Option<NormalizedResponse> {
        self.get_at(key, Instant::now())
    }

    /// Get a cached response as of `now`
    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<NormalizedResponse> {
        if !self.config.enabled {
            return None;
        }

        let generation = self.generation.load(Ordering::Acquire);
        let stale = match self.entries.get(key) {
            Some(entry) if entry.generation == generation && !entry.is_expired_at(now) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache hit");
                return Some(entry.value.clone());
            }
            // Entries from before a clear are left for `clear` itself to count
            Some(entry) => entry.is_expired_at(now),
            None => false,
        };

        if stale {
            // Drop lazily; the guard above is released before taking the shard lock
            let removed = self
                .entries
                .remove_if(key, |_, entry| entry.is_expired_at(now));
            if removed.is_some() {
                self.stats.expirations.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a response in the cache
    pub fn put(&self, key: CacheKey, response: NormalizedResponse) {
        self.put_at(key, response, Instant::now());
    }

    /// Store a response as of `now`
    pub fn put_at(&self, key: CacheKey, response: NormalizedResponse, now: Instant) {
        if !self.config.enabled || self.config.max_entries == 0 {
            return;
        }

        let generation = self.generation.load(Ordering::Acquire);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_entries {
            self.make_room(now);
        }

        debug!(key = %key, "Cached response");
        self.entries
            .insert(key, CacheEntry::new(response, now, self.config.ttl, generation));
        self.stats.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Sweep expired entries, then evict the soonest-expiring one if still full
    fn make_room(&self, now: Instant) {
        self.cleanup_expired_at(now);
        if self.entries.len() < self.config.max_entries {
            return;
        }

        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().expires_at)
            .map(|entry| entry.key().clone());

        if let Some(victim) = victim {
            if self.entries.remove(&victim).is_some() {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(key = %victim, "Evicted cache entry to stay under max_entries");
            }
        }
    }

    /// Clean up expired entries
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    /// Clean up entries expired as of `now`, returning how many were removed
    pub fn cleanup_expired_at(&self, now: Instant) -> usize {
        let generation = self.generation.load(Ordering::Acquire);
        let mut removed = 0usize;

        self.entries.retain(|_, entry| {
            if entry.generation != generation || entry.is_expired_at(now) {
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            self.stats
                .expirations
                .fetch_add(removed as u64, Ordering::Relaxed);
            debug!(removed = removed, "Cleaned up expired cache entries");
        }
        removed
    }

    /// Start the periodic expiry sweep
    pub fn start_cleanup_task(self: Arc<Self>) -> JoinHandle<()> {
        let period = self.config.sweep_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                self.cleanup_expired();
            }
        })
    }

    /// Number of stored entries, including ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics (lock-free snapshot)
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    /// Remove every entry, returning how many were removed
    pub fn clear(&self) -> usize {
        let cleared = self.generation.fetch_add(1, Ordering::AcqRel);
        let mut removed = 0usize;
        self.entries.retain(|_, entry| {
            if entry.generation <= cleared {
                removed += 1;
                false
            } else {
                true
            }
        });

        self.stats.reset();
        info!(removed = removed, "All caches cleared");
        removed
    }
}
