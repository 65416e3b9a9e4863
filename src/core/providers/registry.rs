//! Provider Registry
//!
//! Maps target model ids to the provider that serves them. Routes are either
//! exact model ids or namespace prefixes ending in `/` (`deepseek/`). Exact
//! routes win; among prefixes the longest match wins.

use super::{ProviderClient, ProviderDescriptor, ProviderError};
use crate::utils::error::{GatewayError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Provider selected for a target model
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub provider: Arc<dyn ProviderClient>,
    /// Route entry that matched
    pub route: String,
}

#[derive(Debug, Default)]
struct RegistryInner {
    providers: HashMap<String, Arc<dyn ProviderClient>>,
    exact: HashMap<String, String>,
    prefixes: Vec<(String, String)>,
}

/// Provider registry keyed by route
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    inner: RwLock<RegistryInner>,
}

fn is_prefix_route(route: &str) -> bool {
    route.ends_with('/')
}

impl ProviderRegistry {
    /// Create new provider registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under the routes its descriptor lists
    pub fn register(&self, provider: Arc<dyn ProviderClient>) -> Result<()> {
        let name = provider.name().to_string();
        let routes = provider.descriptor().routes.clone();
        let mut inner = self.inner.write();

        if inner.providers.contains_key(&name) {
            return Err(GatewayError::config(format!(
                "provider '{}' is already registered",
                name
            )));
        }

        for route in &routes {
            let owner = if is_prefix_route(route) {
                inner
                    .prefixes
                    .iter()
                    .find(|(prefix, _)| prefix == route)
                    .map(|(_, owner)| owner.clone())
            } else {
                inner.exact.get(route).cloned()
            };
            if let Some(owner) = owner {
                return Err(GatewayError::config(format!(
                    "route '{}' is already served by provider '{}'",
                    route, owner
                )));
            }
        }

        for route in routes {
            if is_prefix_route(&route) {
                inner.prefixes.push((route, name.clone()));
            } else {
                inner.exact.insert(route, name.clone());
            }
        }
        // Longest prefix first so lookup can stop at the first hit
        inner
            .prefixes
            .sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        info!(provider = %name, kind = %provider.descriptor().kind, "Registered provider");
        inner.providers.insert(name, provider);
        Ok(())
    }

    /// Remove a provider and every route pointing at it
    pub fn remove(&self, name: &str) -> Option<Arc<dyn ProviderClient>> {
        let mut inner = self.inner.write();
        let removed = inner.providers.remove(name)?;
        inner.exact.retain(|_, owner| owner != name);
        inner.prefixes.retain(|(_, owner)| owner != name);
        info!(provider = %name, "Removed provider");
        Some(removed)
    }

    /// Find the provider serving `target_model`.
    ///
    /// Fails with a configuration error when no route matches or the matched
    /// provider has no keys. Never performs I/O.
    pub fn lookup(&self, target_model: &str) -> std::result::Result<RouteMatch, ProviderError> {
        let inner = self.inner.read();

        let matched = inner
            .exact
            .get(target_model)
            .map(|owner| (target_model.to_string(), owner))
            .or_else(|| {
                inner
                    .prefixes
                    .iter()
                    .find(|(prefix, _)| target_model.starts_with(prefix.as_str()))
                    .map(|(prefix, owner)| (prefix.clone(), owner))
            });

        let (route, owner) = matched.ok_or_else(|| {
            ProviderError::configuration(
                "router",
                format!("no provider is registered for model '{}'", target_model),
            )
        })?;

        let provider = inner.providers.get(owner).cloned().ok_or_else(|| {
            ProviderError::configuration(
                owner.as_str(),
                format!("route '{}' points at an unknown provider", route),
            )
        })?;

        if !provider.is_configured() {
            return Err(ProviderError::configuration(
                owner.as_str(),
                format!("provider '{}' has no API keys configured", owner),
            ));
        }

        Ok(RouteMatch { provider, route })
    }

    /// Get provider by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ProviderClient>> {
        self.inner.read().providers.get(name).cloned()
    }

    /// Descriptors of every registered provider, sorted by name
    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        let inner = self.inner.read();
        let mut descriptors: Vec<ProviderDescriptor> = inner
            .providers
            .values()
            .map(|provider| provider.descriptor().clone())
            .collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Check if provider is registered
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().providers.contains_key(name)
    }

    /// Get provider count
    pub fn len(&self) -> usize {
        self.inner.read().providers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().providers.is_empty()
    }
}
