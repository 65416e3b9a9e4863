//! Configuration management for the Gateway
//!
//! This module handles loading, validation, and management of all gateway configuration.
//! A YAML file provides the base; environment knobs are layered on top.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{GatewayError, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Main configuration struct for the Gateway
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Gateway configuration
    pub gateway: GatewayConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml_str(&content)?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let gateway: GatewayConfig = serde_yaml::from_str(content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self { gateway };
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults overlaid with the process environment
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay environment knobs read through `get`, then re-validate.
    ///
    /// Recognised keys: `MAX_RETRIES`, `RETRY_DELAY`, `CACHE_TTL`,
    /// `RATE_LIMIT_WINDOW`, `RATE_LIMIT_MAX_REQUESTS`, `HOST`, `PORT`,
    /// `ADMIN_TOKEN`, `LOG_LEVEL` and `<PROVIDER>_API_KEYS`.
    pub fn with_overrides<F>(mut self, get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gateway = &mut self.gateway;
        let lookup = |key: &str| get(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = lookup("MAX_RETRIES") {
            gateway.router.max_retries = parse_knob("MAX_RETRIES", &value)?;
        }
        if let Some(value) = lookup("RETRY_DELAY") {
            gateway.router.retry_delay_ms = parse_knob("RETRY_DELAY", &value)?;
            gateway.router.max_delay_ms = gateway.router.max_delay_ms.max(gateway.router.retry_delay_ms);
        }
        if let Some(value) = lookup("CACHE_TTL") {
            gateway.cache.ttl_ms = parse_knob("CACHE_TTL", &value)?;
        }
        if let Some(value) = lookup("RATE_LIMIT_WINDOW") {
            gateway.rate_limit.window_ms = parse_knob("RATE_LIMIT_WINDOW", &value)?;
        }
        if let Some(value) = lookup("RATE_LIMIT_MAX_REQUESTS") {
            gateway.rate_limit.max_requests = parse_knob("RATE_LIMIT_MAX_REQUESTS", &value)?;
        }
        if let Some(value) = lookup("HOST") {
            gateway.server.host = value.trim().to_string();
        }
        if let Some(value) = lookup("PORT") {
            gateway.server.port = parse_knob("PORT", &value)?;
        }
        if let Some(value) = lookup("ADMIN_TOKEN") {
            gateway.server.admin_token = Some(value.trim().to_string());
        }
        if let Some(value) = lookup("LOG_LEVEL") {
            gateway.logging.level = value.trim().to_string();
        }

        for provider in &mut gateway.providers {
            let var = provider.api_keys_env_var();
            if let Some(value) = lookup(&var) {
                provider.api_keys = parse_key_list(&value);
                debug!(
                    provider = %provider.name,
                    keys = provider.api_keys.len(),
                    "API keys loaded from {}", var
                );
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.gateway.server
    }

    /// Get providers configuration
    pub fn providers(&self) -> &[ProviderConfig] {
        &self.gateway.providers
    }

    /// Get router settings
    pub fn router(&self) -> &RouterConfig {
        &self.gateway.router
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.gateway.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");
        self.gateway.validate()?;
        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.gateway)
            .map_err(|e| GatewayError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

fn parse_knob<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GatewayError::Config(format!("Invalid value for {}: {}", key, value)))
}
