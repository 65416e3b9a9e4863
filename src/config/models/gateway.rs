//! Main gateway configuration

use super::*;
use crate::core::providers::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Provider configurations
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
    /// Client-facing model name to target model; must contain `default`
    #[serde(default = "default_model_mapping")]
    pub model_mapping: HashMap<String, String>,
    /// Target model to the model tried after it fails
    #[serde(default = "default_fallbacks")]
    pub fallbacks: HashMap<String, String>,
    /// Retry configuration
    #[serde(default)]
    pub router: RouterConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            providers: default_providers(),
            model_mapping: default_model_mapping(),
            fallbacks: default_fallbacks(),
            router: RouterConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Look up a provider entry by name
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }
}

/// OpenRouter for the namespaced models, DashScope for Qwen.
/// Keys come from `OPENROUTER_API_KEYS` / `QWEN_API_KEYS`.
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "openrouter".to_string(),
            kind: ProviderKind::Passthrough,
            endpoint: "https://openrouter.ai/api/v1".to_string(),
            api_keys: vec![],
            api_key_header: default_api_key_header(),
            model_prefix: None,
            routes: vec![
                "deepseek/".to_string(),
                "openai/".to_string(),
                "anthropic/".to_string(),
                "meta-llama/".to_string(),
                "google/".to_string(),
            ],
        },
        ProviderConfig {
            name: "qwen".to_string(),
            kind: ProviderKind::Session,
            endpoint: "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation"
                .to_string(),
            api_keys: vec![],
            api_key_header: default_api_key_header(),
            model_prefix: Some("qwen/".to_string()),
            routes: vec!["qwen/".to_string()],
        },
    ]
}

pub fn default_model_mapping() -> HashMap<String, String> {
    [
        ("default", "deepseek/deepseek-chat"),
        ("gpt-4", "deepseek/deepseek-chat"),
        ("gpt-3.5-turbo", "deepseek/deepseek-chat"),
        ("text-embedding-ada-002", "openai/text-embedding-3-small"),
    ]
    .into_iter()
    .map(|(name, target)| (name.to_string(), target.to_string()))
    .collect()
}

pub fn default_fallbacks() -> HashMap<String, String> {
    HashMap::from([(
        "deepseek/deepseek-chat".to_string(),
        "qwen/qwen-max".to_string(),
    )])
}
