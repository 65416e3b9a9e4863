//! Response cache
//!
//! Successful non-streaming responses are cached under a fingerprint of the
//! resolved target model, the ordered messages and the key-sorted options.

pub mod manager;
pub mod types;


pub use manager::CacheManager;
pub use types::{CacheConfig, CacheEntry, CacheKey, CacheStats};
