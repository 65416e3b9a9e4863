//! Unified provider error handling
//!
//! A single error type for every upstream provider adapter. The executor only
//! looks at [`ProviderError::is_retryable`]; the HTTP layer only looks at
//! [`ProviderError::kind`] and [`ProviderError::http_status`].
//!
//! | Variant | Kind | HTTP Status | Retryable |
//! |------|------|------------|--------|
//! | Configuration | configuration_error | 503 | No |
//! | NotSupported | validation_error | 400 | No |
//! | Network | network_error | 503 | Yes |
//! | Timeout | network_error | 504 | Yes |
//! | ApiError | provider_error | 502 / 503 | Yes |
//! | ResponseParsing | provider_error | 502 | Yes |
//! | Streaming | provider_error | 502 | No (bytes already sent) |

use crate::utils::error::ErrorKind;

/// Unified provider error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("Configuration error for {provider}: {message}")]
    Configuration { provider: String, message: String },

    #[error("Feature '{feature}' not supported by {provider}")]
    NotSupported { provider: String, feature: String },

    #[error("Network error for {provider}: {message}")]
    Network { provider: String, message: String },

    #[error("Timeout for {provider}: {message}")]
    Timeout { provider: String, message: String },

    #[error("API error for {provider} (status {status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Failed to parse {provider} response: {message}")]
    ResponseParsing { provider: String, message: String },

    #[error("Streaming error for {provider}: {message}")]
    Streaming { provider: String, message: String },
}

impl ProviderError {
    /// Create configuration error
    pub fn configuration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create not supported error
    pub fn not_supported(provider: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::NotSupported {
            provider: provider.into(),
            feature: feature.into(),
        }
    }

    /// Create network error
    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create timeout error
    pub fn timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create API error with status code
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create response parsing error
    pub fn response_parsing(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResponseParsing {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create streaming error
    pub fn streaming(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Streaming {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Map a transport failure from reqwest onto the matching variant
    pub fn from_reqwest(provider: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(provider, err.to_string())
        } else if err.is_decode() {
            Self::response_parsing(provider, err.to_string())
        } else if let Some(status) = err.status() {
            Self::api_error(provider, status.as_u16(), err.to_string())
        } else {
            Self::network(provider, err.to_string())
        }
    }

    /// Get the provider name that caused this error
    pub fn provider(&self) -> &str {
        match self {
            Self::Configuration { provider, .. }
            | Self::NotSupported { provider, .. }
            | Self::Network { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::ApiError { provider, .. }
            | Self::ResponseParsing { provider, .. }
            | Self::Streaming { provider, .. } => provider,
        }
    }

    /// Classification surfaced to the caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::NotSupported { .. } => ErrorKind::Validation,
            Self::Network { .. } | Self::Timeout { .. } => ErrorKind::Network,
            Self::ApiError { .. } | Self::ResponseParsing { .. } | Self::Streaming { .. } => {
                ErrorKind::Provider
            }
        }
    }

    /// Whether the executor may spend retry budget on this error.
    ///
    /// Every upstream failure is retried regardless of its status code; only
    /// failures that can never succeed on another attempt are excluded.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::Timeout { .. }
                | Self::ApiError { .. }
                | Self::ResponseParsing { .. }
        )
    }

    /// HTTP status code presented to the client
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Configuration { .. } => 503,
            Self::NotSupported { .. } => 400,
            Self::Network { .. } => 503,
            Self::Timeout { .. } => 504,
            Self::ApiError { status: 503, .. } => 503,
            Self::ApiError { .. } | Self::ResponseParsing { .. } | Self::Streaming { .. } => 502,
        }
    }
}
