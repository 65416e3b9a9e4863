//! run_server entry point

use crate::config::Config;
use crate::core::dispatcher::DispatchEngine;
use crate::server::server::HttpServer;
use crate::server::state::AppState;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::info;

/// Serve the HTTP API over an already-built engine until shutdown
pub async fn run_server(config: Arc<Config>, engine: Arc<DispatchEngine>) -> Result<()> {
    info!(
        version = crate::VERSION,
        address = %config.server().address(),
        "Starting relay gateway"
    );

    HttpServer::new(AppState::new(config, engine)).start().await
}
