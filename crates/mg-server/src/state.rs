//! Server state
//!
//! Shared collaborators for all request handlers: the routing engine, the
//! provider directory, and the lazily constructed remote forwarder. All of
//! them are read-mostly and safe for concurrent access; configuration
//! changes rebuild them atomically via `apply_config`.

use std::sync::Arc;

use mg_config::ConfigManager;
use mg_routing::{RoutePolicy, RoutingEngine};
use parking_lot::RwLock;

use crate::directory::ProviderDirectory;
use crate::forward::HttpForwarder;
use crate::mapping::MappingTable;

/// Routing policy backed by the live configuration
///
/// Re-read on every decision, so a config update flips precedence for the
/// next request without restarting anything.
struct ConfigPolicy {
    config_manager: Arc<ConfigManager>,
}

impl RoutePolicy for ConfigPolicy {
    fn force_priority(&self) -> bool {
        self.config_manager.force_model_mappings()
    }
}

/// Server state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Configuration manager backing policy reads and rebuilds
    pub config_manager: Arc<ConfigManager>,

    /// Route classifier
    pub engine: Arc<RoutingEngine>,

    /// Model -> provider index used by the engine and the dispatcher
    pub directory: Arc<ProviderDirectory>,

    /// Shared outbound HTTP client
    pub http_client: reqwest::Client,

    /// Remote fallback forwarder, constructed on first use
    forwarder: Arc<RwLock<Option<Arc<HttpForwarder>>>>,
}

impl AppState {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        let config = config_manager.get();
        let directory = Arc::new(ProviderDirectory::from_config(&config));
        let policy = Arc::new(ConfigPolicy {
            config_manager: config_manager.clone(),
        });
        let engine = Arc::new(RoutingEngine::new(directory.clone(), policy));
        engine.set_mapper(Arc::new(MappingTable::from_config(&config)));

        Self {
            config_manager,
            engine,
            directory,
            http_client: reqwest::Client::new(),
            forwarder: Arc::new(RwLock::new(None)),
        }
    }

    /// Re-derive collaborators after a configuration change
    ///
    /// The directory is rebuilt in place; the mapping table is replaced
    /// wholesale through the engine's late-binding slot so requests already
    /// past consultation keep the table they saw. The cached forwarder is
    /// dropped and lazily rebuilt on next use.
    pub fn apply_config(&self) {
        let config = self.config_manager.get();
        self.directory.rebuild(&config);
        self.engine
            .set_mapper(Arc::new(MappingTable::from_config(&config)));
        *self.forwarder.write() = None;
    }

    /// The remote forwarding target, if fallback is configured
    ///
    /// Constructed lazily so the gateway starts (and routes locally) even
    /// while the fallback target is unset.
    pub fn remote_forwarder(&self) -> Option<Arc<HttpForwarder>> {
        if let Some(forwarder) = self.forwarder.read().as_ref() {
            return Some(forwarder.clone());
        }

        let fallback = self.config_manager.get().fallback;
        if !fallback.enabled || fallback.base_url.trim().is_empty() {
            return None;
        }

        let forwarder = Arc::new(HttpForwarder::new(
            self.http_client.clone(),
            fallback.base_url,
            fallback.api_key,
        ));
        *self.forwarder.write() = Some(forwarder.clone());
        Some(forwarder)
    }
}
