//! Request dispatch
//!
//! [`DispatchEngine`] is the single entry point the HTTP layer calls. It owns
//! every shared component and runs one request through them in a fixed order:
//!
//! 1. rate limit the caller
//! 2. validate the request
//! 3. resolve the client model name to a target model
//! 4. serve non-streaming requests from the cache when possible
//! 5. run the retry-with-fallback executor
//! 6. cache the response, or hand the upstream stream to the relay

mod admin;
mod types;


pub use types::{DispatchBody, DispatchMetadata, DispatchOutcome, ProviderSummary};

use crate::config::GatewayConfig;
use crate::core::cache_manager::{CacheKey, CacheManager};
use crate::core::providers::{CallMode, HttpClientPool, ProviderOutput, ProviderRegistry, build_client};
use crate::core::rate_limiter::RateLimiter;
use crate::core::resolver::ModelResolver;
use crate::core::router::{FallbackChain, RetryPolicy, Router};
use crate::core::streaming::StreamingHandler;
use crate::core::types::DispatchRequest;
use crate::utils::error::{GatewayError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Shared dispatch engine
#[derive(Debug)]
pub struct DispatchEngine {
    resolver: ModelResolver,
    registry: Arc<ProviderRegistry>,
    fallbacks: Arc<FallbackChain>,
    router: Router,
    cache: Arc<CacheManager>,
    rate_limiter: Arc<RateLimiter>,
    http: HttpClientPool,
}

impl DispatchEngine {
    /// Assemble an engine from already-built components
    pub fn new(
        resolver: ModelResolver,
        registry: Arc<ProviderRegistry>,
        fallbacks: Arc<FallbackChain>,
        policy: RetryPolicy,
        cache: CacheManager,
        rate_limiter: RateLimiter,
        http: HttpClientPool,
    ) -> Self {
        let router = Router::new(registry.clone(), fallbacks.clone(), policy);
        Self {
            resolver,
            registry,
            fallbacks,
            router,
            cache: Arc::new(cache),
            rate_limiter: Arc::new(rate_limiter),
            http,
        }
    }

    /// Build every component from configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let http = HttpClientPool::with_timeout(Duration::from_secs(config.router.timeout_secs))?;

        let registry = Arc::new(ProviderRegistry::new());
        for provider in &config.providers {
            let client = build_client(provider.descriptor(), provider.key_pool(), &http);
            if !client.is_configured() {
                warn!(
                    provider = %provider.name,
                    "Provider has no API keys, requests routed to it will fail"
                );
            }
            registry.register(client)?;
        }

        let resolver = ModelResolver::new(config.model_mapping.clone())?;
        let fallbacks = Arc::new(FallbackChain::from_links(config.fallbacks.clone()));

        Ok(Self::new(
            resolver,
            registry,
            fallbacks,
            config.router.retry_policy(),
            CacheManager::new(config.cache.settings()),
            RateLimiter::new(config.rate_limit.settings()),
            http,
        ))
    }

    /// Serve one client request on behalf of `caller`
    pub async fn resolve_and_dispatch(
        &self,
        caller: &str,
        request: DispatchRequest,
    ) -> Result<DispatchOutcome> {
        let limit = self.rate_limiter.check_and_record(caller);
        if !limit.allowed {
            return Err(GatewayError::RateLimit {
                key: caller.to_string(),
                limit: limit.limit,
                remaining: limit.remaining,
                retry_after_secs: limit.retry_after_secs.unwrap_or(1),
                reset_at: limit.reset_at,
            });
        }
        let rate_limit = self.rate_limiter.is_enabled().then(|| limit.status());

        request.validate().map_err(GatewayError::validation)?;

        let requested_model = request.model.trim().to_string();
        let target_model = self.resolver.resolve(&requested_model);
        let alias = if requested_model.is_empty() {
            target_model.clone()
        } else {
            requested_model.clone()
        };
        let mode = CallMode::for_request(&request);
        debug!(model = %requested_model, target = %target_model, ?mode, "Dispatching request");

        let cache_key = (mode == CallMode::Complete && self.cache.is_enabled())
            .then(|| CacheKey::fingerprint(&target_model, &request));

        if let Some(key) = &cache_key {
            if let Some(mut response) = self.cache.get(key) {
                let served_model = std::mem::replace(&mut response.model, alias);
                return Ok(DispatchOutcome {
                    body: DispatchBody::Complete(response),
                    metadata: DispatchMetadata {
                        requested_model,
                        target_model,
                        served_model,
                        provider: None,
                        attempts: 0,
                        used_fallback: false,
                        cache_hit: true,
                        tried_models: Vec::new(),
                        rate_limit,
                    },
                });
            }
        }

        let execution = self.router.execute(&target_model, &request, mode).await?;

        let body = match execution.result {
            ProviderOutput::Complete(mut response) => {
                if let Some(key) = cache_key {
                    self.cache.put(key, response.clone());
                }
                response.model = alias;
                DispatchBody::Complete(response)
            }
            ProviderOutput::Stream(upstream) => DispatchBody::Stream(
                StreamingHandler::new(execution.provider.clone())
                    .with_model_alias(alias)
                    .create_sse_stream(upstream),
            ),
        };

        Ok(DispatchOutcome {
            body,
            metadata: DispatchMetadata {
                requested_model,
                target_model,
                served_model: execution.model_used,
                provider: Some(execution.provider),
                attempts: execution.attempts,
                used_fallback: execution.used_fallback,
                cache_hit: false,
                tried_models: execution.tried_models,
                rate_limit,
            },
        })
    }

    /// Spawn the cache sweep and idle-bucket cleanup loops
    pub fn start_background_tasks(&self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        if self.cache.is_enabled() {
            handles.push(self.cache.clone().start_cleanup_task());
        }
        if self.rate_limiter.is_enabled() {
            handles.push(self.rate_limiter.clone().start_cleanup_task());
        }
        handles
    }

    pub fn resolver(&self) -> &ModelResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }
}
