//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use pb_common::Secret;
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "policy-bridge.toml",
    "./config/config.toml",
    "/etc/policy-bridge/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load), reading overrides through `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup) {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, &lookup);
        config.validate()?;

        Ok(config)
    }

    fn find_config_file<F>(&self, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Some(path) = lookup("POLICY_BRIDGE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_overrides<F>(config: &mut AppConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(val) = lookup("POLICY_BRIDGE_HTTP_PORT") {
        if let Ok(port) = val.parse() {
            config.http.port = port;
        }
    }
    if let Some(val) = lookup("POLICY_BRIDGE_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("POLICY_BRIDGE_CORS_ORIGINS") {
        config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
    }

    // Outbound client
    if let Some(val) = lookup("POLICY_BRIDGE_HTTP_TIMEOUT_MS") {
        if let Ok(timeout) = val.parse() {
            config.http_client.timeout_ms = timeout;
        }
    }
    if let Some(val) = lookup("POLICY_BRIDGE_HTTP_CONNECT_TIMEOUT_MS") {
        if let Ok(timeout) = val.parse() {
            config.http_client.connect_timeout_ms = timeout;
        }
    }

    // Auth0
    if let Some(val) = lookup("POLICY_BRIDGE_AUTH0_DOMAIN") {
        config.auth0.domain = val;
    }
    if let Some(val) = lookup("POLICY_BRIDGE_AUTH0_CLIENT_ID") {
        config.auth0.client_id = val;
    }
    if let Some(val) = lookup("POLICY_BRIDGE_AUTH0_CLIENT_SECRET") {
        config.auth0.client_secret = Secret::new(val);
    }
    if let Some(val) = lookup("POLICY_BRIDGE_AUTH0_AUDIENCE") {
        config.auth0.audience = val;
    }
    if let Some(val) = lookup("POLICY_BRIDGE_AUTH0_CONNECTION") {
        config.auth0.connection = val;
    }
    if let Some(val) = lookup("POLICY_BRIDGE_AUTH0_BASE_URL") {
        config.auth0.base_url = val;
    }

    // Graph
    if let Some(val) = lookup("POLICY_BRIDGE_GRAPH_TENANT_ID") {
        config.graph.tenant_id = val;
    }
    if let Some(val) = lookup("POLICY_BRIDGE_GRAPH_ISSUER_DOMAIN") {
        config.graph.issuer_domain = val;
    }
    if let Some(val) = lookup("POLICY_BRIDGE_GRAPH_CLIENT_ID") {
        config.graph.client_id = val;
    }
    if let Some(val) = lookup("POLICY_BRIDGE_GRAPH_CLIENT_SECRET") {
        config.graph.client_secret = Secret::new(val);
    }
    if let Some(val) = lookup("POLICY_BRIDGE_GRAPH_CLOUD") {
        config.graph.cloud = val;
    }
    if let Some(val) = lookup("POLICY_BRIDGE_GRAPH_MFA_EXTENSION") {
        config.graph.mfa_extension_name = val;
    }

    // OAuth clients
    if let Some(val) = lookup("POLICY_BRIDGE_GOOGLE_CLIENT_ID") {
        config.oauth.google.client_id = val;
    }
    if let Some(val) = lookup("POLICY_BRIDGE_GOOGLE_CLIENT_SECRET") {
        config.oauth.google.client_secret = Secret::new(val);
    }
    if let Some(val) = lookup("POLICY_BRIDGE_LINKEDIN_CLIENT_ID") {
        config.oauth.linkedin.client_id = val;
    }
    if let Some(val) = lookup("POLICY_BRIDGE_LINKEDIN_CLIENT_SECRET") {
        config.oauth.linkedin.client_secret = Secret::new(val);
    }

    // Testing
    if let Some(val) = lookup("POLICY_BRIDGE_TESTING_ENABLED") {
        config.testing.enabled = val.parse().unwrap_or(false);
    }
    if let Some(val) = lookup("POLICY_BRIDGE_TEST_USERNAME") {
        config.testing.username = val;
    }
    if let Some(val) = lookup("POLICY_BRIDGE_TEST_PASSWORD") {
        config.testing.password = Secret::new(val);
    }

    // General
    if let Some(val) = lookup("POLICY_BRIDGE_DEV_MODE") {
        config.dev_mode = val.parse().unwrap_or(false);
    }
}
