//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::dispatcher::DispatchEngine;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Cloned into every worker; both fields are shared, never copied.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Dispatch engine
    pub engine: Arc<DispatchEngine>,
}

impl AppState {
    /// Create a new AppState with shared resources
    pub fn new(config: Arc<Config>, engine: Arc<DispatchEngine>) -> Self {
        Self { config, engine }
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Admin token, when the admin API is enabled
    pub fn admin_token(&self) -> Option<&str> {
        self.config
            .server()
            .admin_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}
