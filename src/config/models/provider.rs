//! Provider configuration

use super::*;
use crate::core::providers::{ApiKeyPool, ProviderDescriptor, ProviderKind};
use serde::{Deserialize, Serialize};

/// One upstream provider entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name, unique across the gateway
    pub name: String,
    /// Adapter family
    pub kind: ProviderKind,
    /// Base URL for passthrough providers, full URL for session providers
    pub endpoint: String,
    /// API keys used round-robin; `<NAME>_API_KEYS` overrides this list
    #[serde(default)]
    pub api_keys: Vec<String>,
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    /// Prefix stripped from target models before the upstream call
    #[serde(default)]
    pub model_prefix: Option<String>,
    /// Exact model ids, or namespace prefixes ending in `/`
    #[serde(default)]
    pub routes: Vec<String>,
}

impl ProviderConfig {
    /// Environment variable carrying comma-separated keys for this provider
    pub fn api_keys_env_var(&self) -> String {
        let name: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}_API_KEYS", name)
    }

    /// Registry descriptor for this provider
    pub fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            name: self.name.clone(),
            kind: self.kind,
            endpoint: self.endpoint.trim_end_matches('/').to_string(),
            api_key_header: self.api_key_header.clone(),
            model_prefix: self.model_prefix.clone(),
            routes: self.routes.clone(),
        }
    }

    pub fn key_pool(&self) -> ApiKeyPool {
        ApiKeyPool::new(self.api_keys.iter().cloned())
    }
}

/// Split a comma-separated key list
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}
