//! Configuration persistence
//!
//! YAML on disk. A missing file yields the default configuration so a fresh
//! install can start without any setup.

use std::path::Path;

use mg_types::{AppError, AppResult};
use tracing::info;

use crate::types::AppConfig;

/// Load configuration from a YAML file
pub async fn load_config(path: &Path) -> AppResult<AppConfig> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        info!("No configuration file at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    let contents = tokio::fs::read_to_string(path).await?;
    let config: AppConfig = serde_yaml::from_str(&contents)
        .map_err(|e| AppError::Config(format!("Failed to parse {:?}: {}", path, e)))?;
    Ok(config)
}

/// Save configuration to a YAML file, creating parent directories as needed
pub async fn save_config(config: &AppConfig, path: &Path) -> AppResult<()> {
    let contents = serde_yaml::to_string(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize configuration: {}", e)))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}
