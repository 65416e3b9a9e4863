//! Upstream provider clients
//!
//! Every upstream sits behind the [`ProviderClient`] trait so the executor is
//! written once. Three adapters exist:
//!
//! - [`PassthroughProvider`]: OpenAI-shaped REST endpoints (OpenRouter style)
//! - [`SessionProvider`]: session-shaped chat APIs (DashScope style), no streaming
//! - custom providers: passthrough adapters registered at runtime with a model prefix

// Base infrastructure
pub mod base;

pub mod error;
#[cfg(test)]
pub(crate) mod mock;
pub mod passthrough;
pub mod registry;
pub mod session;

pub use base::{ApiKeyPool, HttpClientPool};
pub use error::ProviderError;
pub use passthrough::PassthroughProvider;
pub use registry::{ProviderRegistry, RouteMatch};
pub use session::SessionProvider;

use crate::core::types::{DispatchRequest, NormalizedResponse};
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;

/// Raw upstream byte stream (SSE body)
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ProviderError>> + Send>>;

/// Adapter family a provider belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI-shaped REST passthrough
    Passthrough,
    /// Session-shaped chat API
    Session,
    /// Admin-registered passthrough endpoint
    Custom,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Passthrough => write!(f, "passthrough"),
            ProviderKind::Session => write!(f, "session"),
            ProviderKind::Custom => write!(f, "custom"),
        }
    }
}

/// What a provider can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    pub streaming: bool,
    pub embeddings: bool,
}

/// How the caller wants the upstream answer delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    /// Whole response, parsed and normalized
    Complete,
    /// Raw event stream, relayed as it arrives
    Stream,
}

impl CallMode {
    pub fn for_request(request: &DispatchRequest) -> Self {
        if request.stream {
            CallMode::Stream
        } else {
            CallMode::Complete
        }
    }
}

/// Result of one upstream call
pub enum ProviderOutput {
    Complete(NormalizedResponse),
    Stream(ByteStream),
}

impl std::fmt::Debug for ProviderOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderOutput::Complete(response) => {
                f.debug_tuple("Complete").field(&response.id).finish()
            }
            ProviderOutput::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Static description of a registered provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub kind: ProviderKind,
    pub endpoint: String,
    /// Header carrying the key; `Authorization` gets a `Bearer` prefix
    pub api_key_header: String,
    /// Prefix stripped from the target model before the upstream call
    pub model_prefix: Option<String>,
    /// Exact model ids, or namespace prefixes ending in `/`
    pub routes: Vec<String>,
}

impl ProviderDescriptor {
    /// Upstream model id for a target model
    pub fn upstream_model<'a>(&self, target_model: &'a str) -> &'a str {
        match &self.model_prefix {
            Some(prefix) if !prefix.is_empty() => {
                target_model.strip_prefix(prefix.as_str()).unwrap_or(target_model)
            }
            _ => target_model,
        }
    }

    /// Header name and value for a key
    pub fn auth_header(&self, key: &str) -> (String, String) {
        if self.api_key_header.eq_ignore_ascii_case("authorization") {
            ("Authorization".to_string(), format!("Bearer {}", key))
        } else {
            (self.api_key_header.clone(), key.to_string())
        }
    }
}

/// One upstream provider
#[async_trait]
pub trait ProviderClient: Send + Sync + std::fmt::Debug {
    /// Registered provider name
    fn name(&self) -> &str;

    fn descriptor(&self) -> &ProviderDescriptor;

    fn capabilities(&self) -> ProviderCapabilities;

    /// Whether the provider has at least one key to call with
    fn is_configured(&self) -> bool;

    /// Issue exactly one upstream call for `target_model`.
    ///
    /// Fails with [`ProviderError::Configuration`] before any I/O when no key
    /// is available.
    async fn call(
        &self,
        target_model: &str,
        request: &DispatchRequest,
        mode: CallMode,
    ) -> Result<ProviderOutput, ProviderError>;
}

/// Build the adapter matching a descriptor's kind
pub fn build_client(
    descriptor: ProviderDescriptor,
    keys: ApiKeyPool,
    http: &HttpClientPool,
) -> Arc<dyn ProviderClient> {
    match descriptor.kind {
        ProviderKind::Passthrough | ProviderKind::Custom => {
            Arc::new(PassthroughProvider::new(descriptor, keys, http.clone()))
        }
        ProviderKind::Session => Arc::new(SessionProvider::new(descriptor, keys, http.client())),
    }
}
