//! Error types for the Gateway

use crate::core::providers::ProviderError;
use thiserror::Error;

/// Result type alias for the Gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Stable error classification shown to callers
///
/// Each kind owns a `code` / `type` pair that never changes between releases,
/// plus the default HTTP status used when the error carries no more specific one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Provider has no usable key or the model cannot be routed
    Configuration,
    /// Caller's token bucket is empty
    RateLimitExceeded,
    /// Malformed request or unsupported mode
    Validation,
    /// Timeout or connection failure talking to a provider
    Network,
    /// Upstream provider answered with an error
    Provider,
    /// Admin credentials missing or wrong
    Authentication,
    /// Admin resource does not exist
    NotFound,
    /// Anything not classified above
    Unknown,
}

impl ErrorKind {
    /// Machine-readable error type, e.g. `configuration_error`
    pub fn error_type(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration_error",
            ErrorKind::RateLimitExceeded => "rate_limit_exceeded",
            ErrorKind::Validation => "validation_error",
            ErrorKind::Network => "network_error",
            ErrorKind::Provider => "provider_error",
            ErrorKind::Authentication => "authentication_error",
            ErrorKind::NotFound => "not_found_error",
            ErrorKind::Unknown => "unknown_error",
        }
    }

    /// Upper-case error code, e.g. `CONFIGURATION_ERROR`
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "CONFIGURATION_ERROR",
            ErrorKind::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Provider => "PROVIDER_ERROR",
            ErrorKind::Authentication => "AUTHENTICATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Default HTTP status for the kind
    pub fn default_status(&self) -> u16 {
        match self {
            ErrorKind::Configuration => 503,
            ErrorKind::RateLimitExceeded => 429,
            ErrorKind::Validation => 400,
            ErrorKind::Network => 503,
            ErrorKind::Provider => 502,
            ErrorKind::Authentication => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Unknown => 500,
        }
    }
}

/// Main error type for the Gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller exceeded its rate limit
    #[error("Rate limit exceeded for {key}: limit {limit}, retry after {retry_after_secs}s")]
    RateLimit {
        key: String,
        limit: u32,
        remaining: u32,
        retry_after_secs: u64,
        reset_at: i64,
    },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single provider failure that was not retried
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    /// Retries and fallbacks were exhausted
    #[error("{source} (tried models: {})", .tried_models.join(", "))]
    FallbackExhausted {
        source: ProviderError,
        tried_models: Vec<String>,
    },

    /// Authentication errors on the admin surface
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Stable classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Config(_) => ErrorKind::Configuration,
            GatewayError::RateLimit { .. } => ErrorKind::RateLimitExceeded,
            GatewayError::Validation(_) => ErrorKind::Validation,
            GatewayError::Provider(err) | GatewayError::FallbackExhausted { source: err, .. } => {
                err.kind()
            }
            GatewayError::Unauthorized(_) => ErrorKind::Authentication,
            GatewayError::NotFound(_) => ErrorKind::NotFound,
            GatewayError::Serialization(_)
            | GatewayError::Yaml(_)
            | GatewayError::Io(_)
            | GatewayError::Internal(_) => ErrorKind::Unknown,
        }
    }

    /// HTTP status presented to the client
    pub fn http_status(&self) -> u16 {
        match self {
            GatewayError::Provider(err) | GatewayError::FallbackExhausted { source: err, .. } => {
                err.http_status()
            }
            other => other.kind().default_status(),
        }
    }

    /// Models attempted before giving up, if the error came out of the executor
    pub fn tried_models(&self) -> Option<&[String]> {
        match self {
            GatewayError::FallbackExhausted { tried_models, .. } => Some(tried_models),
            _ => None,
        }
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotSupported { provider, feature } => GatewayError::Validation(
                format!("Feature '{}' not supported by {}", feature, provider),
            ),
            other => GatewayError::Provider(other),
        }
    }
}
