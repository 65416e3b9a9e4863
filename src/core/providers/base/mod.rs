//! Module
//!
//! Contains base components shared by all providers

pub mod connection_pool;
pub mod key_pool;

pub use connection_pool::{HttpClientPool, PoolConfig};
pub use key_pool::ApiKeyPool;
