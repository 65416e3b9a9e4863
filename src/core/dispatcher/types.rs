//! Dispatch result types

use crate::core::providers::{ProviderClient, ProviderKind};
use crate::core::rate_limiter::RateLimitStatus;
use crate::core::types::NormalizedResponse;
use crate::utils::error::Result;
use bytes::Bytes;
use serde::Serialize;
use tokio_stream::wrappers::ReceiverStream;

/// What the client receives
#[derive(Debug)]
pub enum DispatchBody {
    /// Whole normalized response, `model` already set to the client name
    Complete(NormalizedResponse),
    /// SSE bytes ready to be written to the client
    Stream(ReceiverStream<Result<Bytes>>),
}

/// How a request was served
#[derive(Debug, Clone, Serialize)]
pub struct DispatchMetadata {
    /// Model name the client asked for
    pub requested_model: String,
    /// Target model the mapping table resolved to
    pub target_model: String,
    /// Target model that actually produced the answer
    pub served_model: String,
    /// Serving provider; unknown on cache hits
    pub provider: Option<String>,
    /// Upstream calls made for this request
    pub attempts: u32,
    pub used_fallback: bool,
    pub cache_hit: bool,
    /// Models exhausted before the serving one
    pub tried_models: Vec<String>,
    /// Caller's bucket after this request; absent when limiting is off
    pub rate_limit: Option<RateLimitStatus>,
}

/// Dispatch result
#[derive(Debug)]
pub struct DispatchOutcome {
    pub body: DispatchBody,
    pub metadata: DispatchMetadata,
}

/// Admin view of a registered provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSummary {
    pub name: String,
    pub kind: ProviderKind,
    pub endpoint: String,
    pub model_prefix: Option<String>,
    pub routes: Vec<String>,
    /// At least one API key is available
    pub configured: bool,
    pub streaming: bool,
    pub embeddings: bool,
}

impl ProviderSummary {
    pub fn of(provider: &dyn ProviderClient) -> Self {
        let descriptor = provider.descriptor();
        let capabilities = provider.capabilities();
        Self {
            name: descriptor.name.clone(),
            kind: descriptor.kind,
            endpoint: descriptor.endpoint.clone(),
            model_prefix: descriptor.model_prefix.clone(),
            routes: descriptor.routes.clone(),
            configured: provider.is_configured(),
            streaming: capabilities.streaming,
            embeddings: capabilities.embeddings,
        }
    }
}
