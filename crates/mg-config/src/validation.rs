//! Configuration validation
//!
//! Rejects configurations that would make routing ambiguous or the
//! fallback target unreachable before they are accepted into memory.

use std::collections::HashSet;

use mg_types::{AppError, AppResult};

use crate::types::AppConfig;

pub fn validate_config(config: &AppConfig) -> AppResult<()> {
    let mut seen = HashSet::new();
    for provider in &config.providers {
        if provider.name.trim().is_empty() {
            return Err(AppError::Config("Provider name cannot be empty".into()));
        }
        if !seen.insert(provider.name.as_str()) {
            return Err(AppError::Config(format!(
                "Duplicate provider name '{}'",
                provider.name
            )));
        }
        if provider.base_url.trim().is_empty() {
            return Err(AppError::Config(format!(
                "Provider '{}' has no base_url",
                provider.name
            )));
        }
    }

    for rule in &config.model_mappings {
        if rule.from.trim().is_empty() {
            return Err(AppError::Config(
                "Model mapping with empty 'from' model".into(),
            ));
        }
        // An empty 'to' is a disabled rule, not an error.
    }

    if config.fallback.enabled && config.fallback.base_url.trim().is_empty() {
        return Err(AppError::Config(
            "Fallback is enabled but has no base_url".into(),
        ));
    }

    Ok(())
}
