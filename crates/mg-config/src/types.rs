use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Locally configured model providers, in priority order
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,

    /// Operator-defined model substitutions
    #[serde(default)]
    pub model_mappings: Vec<ModelMappingRule>,

    /// When true, model mappings are consulted before local provider
    /// availability (mapping wins even if a local provider could serve the
    /// requested model directly)
    #[serde(default)]
    pub force_model_mappings: bool,

    /// Remote paid service used when no local capability exists
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server bind settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8317
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// A locally configured provider and the models it serves
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Unique provider identifier (e.g. "ollama-local")
    pub name: String,

    /// Disabled providers keep their configuration but never serve requests
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Upstream endpoint requests are dispatched to
    pub base_url: String,

    /// Optional bearer credential for the upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base model names this provider can serve
    #[serde(default)]
    pub models: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

/// One operator-defined model substitution
///
/// An empty or whitespace-only `to` disables the rule without deleting it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelMappingRule {
    pub from: String,
    pub to: String,
}

/// Remote fallback target configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FallbackConfig {
    /// Fallback is opt-in; disabled means unroutable requests surface an
    /// error instead of being forwarded
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the remote service
    #[serde(default)]
    pub base_url: String,

    /// Credential injected on forwarded requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default tracing filter directive (overridable via RUST_LOG)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
