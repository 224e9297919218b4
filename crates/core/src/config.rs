use crate::{PilotError, PilotResult};
use serde::Deserialize;

/// Root application configuration. Loaded from environment variables with the
/// prefix `ADPILOT__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

/// Ad-platform API access.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Graph API access token. Empty in development; the memory-backed
    /// platform stub is used instead.
    #[serde(default)]
    pub access_token: String,
    /// Platform user id that owns the ad accounts.
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileConfig {
    /// Upper bound on concurrently in-flight per-account fetch tasks.
    #[serde(default = "default_fanout")]
    pub max_fanout: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_base_url() -> String {
    "https://graph.facebook.com/v12.0".to_string()
}
fn default_max_attempts() -> u32 {
    9
}
fn default_request_timeout_secs() -> u64 {
    25
}
fn default_fanout() -> usize {
    16
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: String::new(),
            user_id: String::new(),
            max_attempts: default_max_attempts(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            max_fanout: default_fanout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional file.
    pub fn load() -> PilotResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("adpilot").required(false))
            .add_source(
                config::Environment::with_prefix("ADPILOT")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder
            .build()
            .map_err(|e| PilotError::Config(e.to_string()))?;
        config
            .try_deserialize()
            .map_err(|e| PilotError::Config(e.to_string()))
    }
}
