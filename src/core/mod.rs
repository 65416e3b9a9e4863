//! Core functionality for the Gateway
//!
//! This module contains the dispatch engine and the components it is built from.

pub mod cache_manager;
pub mod dispatcher;
pub mod providers;
pub mod rate_limiter;
pub mod resolver;
pub mod router;
pub mod streaming;
pub mod types;

use crate::config::Config;
use crate::utils::error::Result;
use dispatcher::DispatchEngine;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Main Gateway struct that orchestrates all components
#[derive(Debug, Clone)]
pub struct Gateway {
    /// Gateway configuration
    config: Arc<Config>,
    /// Request dispatch engine
    engine: Arc<DispatchEngine>,
}

impl Gateway {
    /// Create a new Gateway instance
    pub fn new(config: Config) -> Result<Self> {
        info!("Initializing Gateway");

        debug!("Initializing dispatch engine");
        let engine = Arc::new(DispatchEngine::from_config(&config.gateway)?);

        info!(
            providers = engine.registry().len(),
            models = engine.client_models().len(),
            "Gateway initialized successfully"
        );

        Ok(Self {
            config: Arc::new(config),
            engine,
        })
    }

    /// Start background services and serve HTTP until shutdown
    pub async fn run(self) -> Result<()> {
        info!("Starting Gateway server");

        debug!("Starting background services");
        let tasks = self.engine.start_background_tasks();

        let result = crate::server::run_server(self.config.clone(), self.engine.clone()).await;

        for task in tasks {
            task.abort();
        }
        info!("Gateway shutdown completed");
        result
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &Arc<DispatchEngine> {
        &self.engine
    }

    /// Health check
    pub fn health_check(&self) -> HealthStatus {
        health_of(&self.engine)
    }
}

/// Summarize component health for `/health`
pub fn health_of(engine: &DispatchEngine) -> HealthStatus {
    let mut components = HashMap::new();

    let providers = engine.providers();
    let configured = providers.iter().filter(|p| p.configured).count();
    components.insert(
        "providers".to_string(),
        ComponentHealth {
            status: if configured > 0 { "healthy" } else { "degraded" }.to_string(),
            message: Some(format!(
                "{} of {} providers have API keys",
                configured,
                providers.len()
            )),
        },
    );

    let cache = engine.cache_stats();
    components.insert(
        "cache".to_string(),
        ComponentHealth {
            status: if engine.cache().is_enabled() {
                "healthy"
            } else {
                "disabled"
            }
            .to_string(),
            message: Some(format!("{} entries", cache.entries)),
        },
    );

    HealthStatus {
        status: if configured > 0 { "healthy" } else { "degraded" }.to_string(),
        version: crate::VERSION,
        timestamp: chrono::Utc::now(),
        components,
    }
}

/// Health status response
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthStatus {
    /// Overall system status
    pub status: String,
    pub version: &'static str,
    /// Timestamp when health was checked
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Health status of individual components
    pub components: HashMap<String, ComponentHealth>,
}

/// Component health status
#[derive(Debug, Clone, serde::Serialize)]
pub struct ComponentHealth {
    /// Component status
    pub status: String,
    /// Optional status message
    pub message: Option<String>,
}
