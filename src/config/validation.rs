//! Configuration validation
//!
//! This module provides validation logic for all configuration structures.

use super::models::*;
use crate::core::providers::ProviderKind;
use crate::core::resolver::DEFAULT_MAPPING;
use crate::utils::error::{GatewayError, Result};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use url::Url;

/// Check that an endpoint is an absolute http(s) URL with a host
pub fn validate_endpoint(url_str: &str, context: &str) -> Result<()> {
    let url = Url::parse(url_str)
        .map_err(|e| GatewayError::Config(format!("{} has invalid URL format: {}", context, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(GatewayError::Config(format!(
                "{} must use http:// or https:// scheme, got: {}",
                context, scheme
            )));
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(GatewayError::Config(format!(
            "{} URL must have a valid host",
            context
        )));
    }

    Ok(())
}

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<()> {
        debug!("Validating gateway configuration");

        self.server.validate()?;

        // Check for duplicate provider names and routes
        let mut provider_names = HashSet::new();
        let mut route_owners: HashMap<&str, &str> = HashMap::new();
        for provider in &self.providers {
            if !provider_names.insert(provider.name.as_str()) {
                return Err(GatewayError::Config(format!(
                    "Duplicate provider name: {}",
                    provider.name
                )));
            }
            provider.validate()?;

            for route in &provider.routes {
                if let Some(owner) = route_owners.insert(route.as_str(), provider.name.as_str()) {
                    return Err(GatewayError::Config(format!(
                        "Route '{}' is claimed by both {} and {}",
                        route, owner, provider.name
                    )));
                }
            }
        }

        match self.model_mapping.get(DEFAULT_MAPPING) {
            Some(target) if !target.trim().is_empty() => {}
            _ => {
                return Err(GatewayError::Config(format!(
                    "model_mapping must contain a non-empty '{}' entry",
                    DEFAULT_MAPPING
                )));
            }
        }

        for (name, target) in &self.model_mapping {
            if name.trim().is_empty() || target.trim().is_empty() {
                return Err(GatewayError::Config(format!(
                    "model_mapping entry '{}' -> '{}' must not be empty",
                    name, target
                )));
            }
        }

        for (model, fallback) in &self.fallbacks {
            if fallback.trim().is_empty() {
                return Err(GatewayError::Config(format!(
                    "Fallback for {} must not be empty",
                    model
                )));
            }
            if model == fallback {
                warn!("Fallback for {} points at itself and will never be used", model);
            }
        }

        self.router.validate()?;
        self.cache.validate()?;
        self.rate_limit.validate()?;

        debug!("Gateway configuration validation completed");
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        debug!("Validating server configuration");

        if self.host.is_empty() {
            return Err(GatewayError::Config(
                "Server host cannot be empty".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(GatewayError::Config(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(GatewayError::Config(
                    "Worker count must be greater than 0".to_string(),
                ));
            }
            if workers > 1000 {
                return Err(GatewayError::Config(
                    "Worker count seems too high (>1000)".to_string(),
                ));
            }
        }

        if self.max_body_size == 0 {
            return Err(GatewayError::Config(
                "Max body size must be greater than 0".to_string(),
            ));
        }

        self.cors
            .validate()
            .map_err(|e| GatewayError::Config(format!("CORS config error: {}", e)))?;

        if !self.admin_enabled() {
            debug!("No admin token configured, admin API disabled");
        }

        Ok(())
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> Result<()> {
        debug!("Validating provider configuration: {}", self.name);

        if self.name.trim().is_empty() {
            return Err(GatewayError::Config(
                "Provider name cannot be empty".to_string(),
            ));
        }

        validate_endpoint(&self.endpoint, &format!("Provider {} endpoint", self.name))?;

        if self.api_key_header.trim().is_empty() {
            return Err(GatewayError::Config(format!(
                "Provider {} api_key_header cannot be empty",
                self.name
            )));
        }

        if self.routes.iter().any(|route| route.trim().is_empty()) {
            return Err(GatewayError::Config(format!(
                "Provider {} has an empty route",
                self.name
            )));
        }

        if self.kind == ProviderKind::Custom && self.model_prefix.is_none() {
            return Err(GatewayError::Config(format!(
                "Custom provider {} requires a model_prefix",
                self.name
            )));
        }

        if self.api_keys.is_empty() {
            warn!(
                "Provider {} has no API keys; set {} to enable it",
                self.name,
                self.api_keys_env_var()
            );
        }

        Ok(())
    }
}

impl Validate for RouterConfig {
    fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(GatewayError::Config(
                "max_retries must be at least 1".to_string(),
            ));
        }

        if self.max_delay_ms < self.retry_delay_ms {
            return Err(GatewayError::Config(
                "max_delay_ms must not be lower than retry_delay_ms".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(GatewayError::Config(
                "Upstream timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<()> {
        if self.enabled && self.max_entries == 0 {
            return Err(GatewayError::Config(
                "Cache max_entries must be greater than 0".to_string(),
            ));
        }

        if self.enabled && self.ttl_ms == 0 {
            warn!("Cache TTL is 0, responses will not be cached");
        }

        Ok(())
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.max_requests == 0 {
            return Err(GatewayError::Config(
                "Rate limit max_requests must be greater than 0".to_string(),
            ));
        }

        if self.window_ms == 0 {
            return Err(GatewayError::Config(
                "Rate limit window must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
