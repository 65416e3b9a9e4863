//! Model resolution
//!
//! Client-facing model names map to target model ids through a mutable table.
//! The `default` entry is mandatory and catches every name without its own
//! mapping, so resolution itself never fails.

use crate::utils::error::{GatewayError, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Key of the mandatory catch-all mapping
pub const DEFAULT_MAPPING: &str = "default";

/// Client model name → target model table
#[derive(Debug)]
pub struct ModelResolver {
    mappings: RwLock<HashMap<String, String>>,
}

impl ModelResolver {
    /// Build a resolver; the table must contain a `default` entry
    pub fn new(mappings: HashMap<String, String>) -> Result<Self> {
        match mappings.get(DEFAULT_MAPPING) {
            Some(target) if !target.trim().is_empty() => {}
            _ => {
                return Err(GatewayError::config(
                    "model mapping must contain a non-empty 'default' entry",
                ));
            }
        }

        Ok(Self {
            mappings: RwLock::new(mappings),
        })
    }

    /// Resolve a client model name; unknown or empty names use `default`
    pub fn resolve(&self, name: &str) -> String {
        let mappings = self.mappings.read();
        match mappings.get(name.trim()) {
            Some(target) => target.clone(),
            None => {
                debug!(model = name, "No explicit mapping, using default");
                // `new` and `remove_mapping` keep the default entry present
                mappings.get(DEFAULT_MAPPING).cloned().unwrap_or_default()
            }
        }
    }

    /// Add or replace a mapping, returning the previous target
    pub fn set_mapping(&self, name: &str, target: &str) -> Result<Option<String>> {
        let name = name.trim();
        let target = target.trim();
        if name.is_empty() || target.is_empty() {
            return Err(GatewayError::validation(
                "model name and target must not be empty",
            ));
        }

        info!(model = name, target = target, "Updated model mapping");
        Ok(self
            .mappings
            .write()
            .insert(name.to_string(), target.to_string()))
    }

    /// Remove a mapping; the `default` entry cannot be removed
    pub fn remove_mapping(&self, name: &str) -> Result<String> {
        if name == DEFAULT_MAPPING {
            return Err(GatewayError::validation(
                "the 'default' mapping cannot be removed",
            ));
        }

        let removed = self
            .mappings
            .write()
            .remove(name)
            .ok_or_else(|| GatewayError::not_found(format!("model mapping '{}'", name)))?;
        info!(model = name, "Removed model mapping");
        Ok(removed)
    }

    /// Snapshot of the table, sorted by client name
    pub fn mappings(&self) -> BTreeMap<String, String> {
        self.mappings
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Client-visible model names (everything except `default`)
    pub fn client_models(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .mappings
            .read()
            .keys()
            .filter(|name| name.as_str() != DEFAULT_MAPPING)
            .cloned()
            .collect();
        names.sort();
        names
    }
}
