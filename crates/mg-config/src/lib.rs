//! Configuration management module
//!
//! Handles loading, saving, and managing application configuration. The
//! manager hands out point-in-time snapshots; updates are validated and
//! applied atomically so no reader ever observes a half-applied change.

use std::path::PathBuf;
use std::sync::Arc;

use mg_types::AppResult;
use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

mod storage;
pub mod types;
mod validation;

pub use storage::{load_config, save_config};
pub use types::*;
pub use validation::validate_config;

/// Thread-safe configuration manager
#[derive(Debug)]
pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
    config_path: PathBuf,
    /// Mutex to serialize disk writes, preventing concurrent save races
    save_mutex: Arc<AsyncMutex<()>>,
}

impl Clone for ConfigManager {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            config_path: self.config_path.clone(),
            save_mutex: self.save_mutex.clone(),
        }
    }
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new(config: AppConfig, config_path: PathBuf) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
            save_mutex: Arc::new(AsyncMutex::new(())),
        }
    }

    /// Load configuration from a path
    pub async fn load_from_path(path: PathBuf) -> AppResult<Self> {
        let config = load_config(&path).await?;
        validation::validate_config(&config)?;
        Ok(Self::new(config, path))
    }

    /// Get a read-only copy of the configuration
    pub fn get(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// Live-read the mapping-priority flag without cloning the whole config
    pub fn force_model_mappings(&self) -> bool {
        self.config.read().force_model_mappings
    }

    /// Update configuration with a function
    ///
    /// The mutation is validated before it replaces the current config; on
    /// validation failure the previous config stays in place untouched.
    /// To persist changes, call `save()` afterwards.
    pub fn update<F>(&self, f: F) -> AppResult<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write();
        // Clone before mutating so we can roll back if validation fails
        let mut new_config = config.clone();
        f(&mut new_config);
        validation::validate_config(&new_config)?;
        *config = new_config;
        Ok(())
    }

    /// Save configuration to disk
    ///
    /// Serialized by a mutex so queued saves always write the most
    /// up-to-date in-memory state.
    pub async fn save(&self) -> AppResult<()> {
        let _guard = self.save_mutex.lock().await;
        let config = self.config.read().clone();
        save_config(&config, &self.config_path).await
    }

    /// Manually reload configuration from disk
    pub async fn reload(&self) -> AppResult<()> {
        let new_config = load_config(&self.config_path).await?;
        validation::validate_config(&new_config)?;
        *self.config.write() = new_config;
        info!("Configuration reloaded from {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}
