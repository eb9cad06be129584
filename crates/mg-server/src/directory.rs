//! Provider directory
//!
//! Read-mostly index from base model names to the providers configured to
//! serve them, rebuilt atomically on configuration changes so no request
//! observes a partially-updated table. Provider order follows the
//! configuration; the first provider for a model is authoritative for
//! reporting.

use std::collections::HashMap;

use mg_config::{AppConfig, ProviderConfig};
use mg_routing::ProviderLookup;
use parking_lot::RwLock;

pub struct ProviderDirectory {
    inner: RwLock<DirectoryInner>,
}

#[derive(Default)]
struct DirectoryInner {
    /// Lowercased base model name -> provider names in config order
    by_model: HashMap<String, Vec<String>>,
    /// Provider name -> full configuration (for dispatch)
    providers: HashMap<String, ProviderConfig>,
}

impl ProviderDirectory {
    pub fn from_config(config: &AppConfig) -> Self {
        let directory = Self {
            inner: RwLock::new(DirectoryInner::default()),
        };
        directory.rebuild(config);
        directory
    }

    /// Rebuild the directory from a configuration snapshot
    pub fn rebuild(&self, config: &AppConfig) {
        let mut inner = DirectoryInner::default();
        for provider in config.providers.iter().filter(|p| p.enabled) {
            for model in &provider.models {
                let entry = inner.by_model.entry(model.to_lowercase()).or_default();
                if !entry.contains(&provider.name) {
                    entry.push(provider.name.clone());
                }
            }
            inner.providers.insert(provider.name.clone(), provider.clone());
        }
        *self.inner.write() = inner;
    }

    /// Look up a provider's configuration by name
    pub fn provider(&self, name: &str) -> Option<ProviderConfig> {
        self.inner.read().providers.get(name).cloned()
    }

    /// All locally served base models with their authoritative provider,
    /// sorted by model name
    pub fn local_models(&self) -> Vec<(String, String)> {
        let inner = self.inner.read();
        let mut models: Vec<(String, String)> = inner
            .by_model
            .iter()
            .filter_map(|(model, providers)| {
                providers.first().map(|p| (model.clone(), p.clone()))
            })
            .collect();
        models.sort();
        models
    }
}

impl ProviderLookup for ProviderDirectory {
    fn providers_for(&self, base_model: &str) -> Vec<String> {
        self.inner
            .read()
            .by_model
            .get(&base_model.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}
