//! Runtime administration of the engine's mutable tables

use super::{DispatchEngine, ProviderSummary};
use crate::config::{ProviderConfig, Validate};
use crate::core::cache_manager::CacheStats;
use crate::core::providers::{ProviderKind, build_client};
use crate::core::rate_limiter::RateLimitStatus;
use crate::utils::error::{GatewayError, Result};
use std::collections::BTreeMap;
use tracing::info;

/// Admin input problems are the caller's fault, not the gateway's
fn as_validation(error: GatewayError) -> GatewayError {
    match error {
        GatewayError::Config(message) => GatewayError::Validation(message),
        other => other,
    }
}

impl DispatchEngine {
    /// Drop every cached response, returning how many were removed
    pub fn clear_cache(&self) -> usize {
        self.cache.clear()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Current bucket state for a caller; `None` when limiting is off
    pub fn rate_limit_status(&self, caller: &str) -> Option<RateLimitStatus> {
        self.rate_limiter.status(caller)
    }

    /// Client-visible model names
    pub fn client_models(&self) -> Vec<String> {
        self.resolver.client_models()
    }

    pub fn mappings(&self) -> BTreeMap<String, String> {
        self.resolver.mappings()
    }

    /// Add or replace a mapping, returning the previous target
    pub fn set_mapping(&self, name: &str, target: &str) -> Result<Option<String>> {
        self.resolver.set_mapping(name, target)
    }

    pub fn remove_mapping(&self, name: &str) -> Result<String> {
        self.resolver.remove_mapping(name)
    }

    pub fn fallbacks(&self) -> BTreeMap<String, String> {
        self.fallbacks.snapshot()
    }

    /// Add or replace the fallback of a target model
    pub fn set_fallback(&self, model: &str, fallback: &str) -> Result<Option<String>> {
        let model = model.trim();
        let fallback = fallback.trim();
        if model.is_empty() || fallback.is_empty() {
            return Err(GatewayError::validation(
                "model and fallback must not be empty",
            ));
        }
        info!(model = model, fallback = fallback, "Updated fallback");
        Ok(self.fallbacks.set(model, fallback))
    }

    pub fn remove_fallback(&self, model: &str) -> Result<String> {
        let removed = self
            .fallbacks
            .remove(model)
            .ok_or_else(|| GatewayError::not_found(format!("fallback for '{}'", model)))?;
        info!(model = model, "Removed fallback");
        Ok(removed)
    }

    /// Every registered provider, sorted by name
    pub fn providers(&self) -> Vec<ProviderSummary> {
        self.registry
            .descriptors()
            .iter()
            .filter_map(|descriptor| self.registry.get(&descriptor.name))
            .map(|provider| ProviderSummary::of(provider.as_ref()))
            .collect()
    }

    /// Register a custom passthrough provider at runtime
    pub fn register_custom_provider(&self, config: ProviderConfig) -> Result<ProviderSummary> {
        if config.kind != ProviderKind::Custom {
            return Err(GatewayError::validation(format!(
                "only custom providers can be registered at runtime, got {}",
                config.kind
            )));
        }
        config.validate().map_err(as_validation)?;

        let client = build_client(config.descriptor(), config.key_pool(), &self.http);
        let summary = ProviderSummary::of(client.as_ref());
        self.registry.register(client).map_err(as_validation)?;

        info!(
            provider = %summary.name,
            routes = ?summary.routes,
            "Registered custom provider"
        );
        Ok(summary)
    }

    /// Remove a custom provider together with its routes
    pub fn remove_custom_provider(&self, name: &str) -> Result<ProviderSummary> {
        let provider = self
            .registry
            .get(name)
            .ok_or_else(|| GatewayError::not_found(format!("provider '{}'", name)))?;

        if provider.descriptor().kind != ProviderKind::Custom {
            return Err(GatewayError::validation(format!(
                "provider '{}' is not a custom provider",
                name
            )));
        }

        let summary = ProviderSummary::of(provider.as_ref());
        self.registry.remove(name);
        info!(provider = name, "Removed custom provider");
        Ok(summary)
    }
}
