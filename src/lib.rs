//! # Relay Gateway
//!
//! An OpenAI-compatible gateway that dispatches chat and embedding requests
//! across interchangeable upstream providers.
//!
//! ## Features
//!
//! - **OpenAI Compatible**: `/v1/chat/completions`, `/v1/embeddings` and `/v1/models`
//! - **Model Mapping**: client model names resolve to provider-native target models
//! - **Retry and Fallback**: bounded retries with exponential backoff, then a fallback chain
//! - **Response Cache**: TTL cache keyed by a canonical request fingerprint
//! - **Rate Limiting**: per-caller token buckets
//! - **Streaming Support**: SSE relay with in-band error reporting
//!
//! ## Gateway Mode
//!
//! ```rust,no_run
//! use relay_gateway::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml").await?;
//!     let gateway = Gateway::new(config)?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Embedded Dispatch
//!
//! ```rust,no_run
//! use relay_gateway::{Config, DispatchEngine, DispatchRequest, user_message};
//!
//! # async fn run() -> relay_gateway::Result<()> {
//! let config = Config::from_env()?;
//! let engine = DispatchEngine::from_config(&config.gateway)?;
//! let outcome = engine
//!     .resolve_and_dispatch("local", DispatchRequest::chat("gpt-4", vec![user_message("Hi")]))
//!     .await?;
//! println!("served by {}", outcome.metadata.served_model);
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

// Public module exports
pub mod config;
pub mod core;
pub mod server;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::Gateway;
pub use utils::error::{GatewayError, Result};

pub use core::dispatcher::{DispatchBody, DispatchEngine, DispatchMetadata, DispatchOutcome};
pub use core::providers::{ProviderClient, ProviderError, ProviderKind, ProviderRegistry};
pub use core::types::{
    ChatMessage, DispatchRequest, MessageContent, MessageRole, NormalizedResponse,
    assistant_message, system_message, user_message,
};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Gateway build information
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Unix time of the build
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
            rust_version: option_env!("RUST_VERSION").unwrap_or("unknown"),
        }
    }
}

/// Build information baked in by the build script
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
