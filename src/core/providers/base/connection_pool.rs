use std::time::Duration;

use reqwest::Client;

use crate::core::providers::error::ProviderError;

/// Shared HTTP client settings
pub struct PoolConfig;
impl PoolConfig {
    pub const TIMEOUT_SECS: u64 = 120;
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const POOL_SIZE: usize = 80;
    pub const KEEPALIVE_SECS: u64 = 90;
}

/// Pooled `reqwest` clients shared by every provider adapter
///
/// Non-streaming calls run under a whole-request deadline. Streaming calls use
/// a client without one: the deadline covers only the wait for response
/// headers, and a stalled body is caught per chunk by [`HttpClientPool::idle_timeout`].
#[derive(Debug, Clone)]
pub struct HttpClientPool {
    client: Client,
    stream_client: Client,
    timeout: Duration,
}

impl HttpClientPool {
    /// Create a pool with the default request timeout
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(Duration::from_secs(PoolConfig::TIMEOUT_SECS))
    }

    /// Create a pool whose requests time out after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        let client = Self::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::configuration("http", e.to_string()))?;
        let stream_client = Self::builder()
            .build()
            .map_err(|e| ProviderError::configuration("http", e.to_string()))?;

        Ok(Self {
            client,
            stream_client,
            timeout,
        })
    }

    fn builder() -> reqwest::ClientBuilder {
        Client::builder()
            .connect_timeout(Duration::from_secs(PoolConfig::CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(PoolConfig::KEEPALIVE_SECS))
            .pool_max_idle_per_host(PoolConfig::POOL_SIZE)
    }

    /// Client for non-streaming calls (cheap to clone)
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Client for streaming calls, without a whole-request deadline
    pub fn stream_client(&self) -> Client {
        self.stream_client.clone()
    }

    /// Deadline for a full non-streaming call, or for stream headers
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Longest silence tolerated between two chunks of a stream
    pub fn idle_timeout(&self) -> Duration {
        self.timeout
    }
}

/// Pull a readable message out of an upstream error body
pub fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let message = value
            .pointer("/error/message")
            .or_else(|| value.get("message"))
            .and_then(|m| m.as_str());
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.chars().take(512).collect()
    }
}
