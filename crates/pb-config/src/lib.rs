//! Policy Bridge Configuration System
//!
//! TOML-based configuration with environment variable overrides. Every
//! section has defaults, so an empty file (or no file at all) is valid.

use pb_common::Secret;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub http_client: HttpClientConfig,
    pub auth0: Auth0Config,
    pub graph: GraphConfig,
    pub oauth: OAuthConfig,
    pub providers: ProviderEndpoints,
    pub testing: TestingConfig,

    /// Enable development mode (permissive CORS)
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            http_client: HttpClientConfig::default(),
            auth0: Auth0Config::default(),
            graph: GraphConfig::default(),
            oauth: OAuthConfig::default(),
            providers: ProviderEndpoints::default(),
            testing: TestingConfig::default(),
            dev_mode: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Outbound HTTP client settings shared by all vendor clients
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            connect_timeout_ms: 5_000,
            user_agent: "policy-bridge".to_string(),
        }
    }
}

/// Auth0 (legacy provider) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Auth0Config {
    /// Tenant domain, e.g. `my-tenant.eu.auth0.com`
    pub domain: String,
    pub client_id: String,
    pub client_secret: Secret,
    /// Audience for password-grant validation (optional)
    pub audience: String,
    /// Database connection used when creating users
    pub connection: String,
    /// Overrides `https://{domain}`; used to point at a local stub
    pub base_url: String,
}

impl Default for Auth0Config {
    fn default() -> Self {
        Self {
            domain: String::new(),
            client_id: String::new(),
            client_secret: Secret::default(),
            audience: String::new(),
            connection: "Username-Password-Authentication".to_string(),
            base_url: String::new(),
        }
    }
}

impl Auth0Config {
    /// Base URL for token and management calls.
    pub fn effective_base_url(&self) -> String {
        if !self.base_url.is_empty() {
            return self.base_url.trim_end_matches('/').to_string();
        }
        format!("https://{}", self.domain.trim_end_matches('/'))
    }
}

/// Microsoft Graph (new directory) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub tenant_id: String,
    /// Issuer used for `emailAddress` identities; derived from the tenant when empty
    pub issuer_domain: String,
    pub client_id: String,
    pub client_secret: Secret,
    /// public, government or china
    pub cloud: String,
    /// Overrides the cloud's login host
    pub login_base_url: String,
    /// Overrides the cloud's Graph host
    pub graph_base_url: String,
    /// Open extension name holding the MFA flag
    pub mfa_extension_name: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            issuer_domain: String::new(),
            client_id: String::new(),
            client_secret: Secret::default(),
            cloud: "public".to_string(),
            login_base_url: String::new(),
            graph_base_url: String::new(),
            mfa_extension_name: "com.policybridge.mfa".to_string(),
        }
    }
}

/// OAuth client registrations used for test credential login
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub google: OAuthClientConfig,
    pub linkedin: OAuthClientConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: Secret,
    /// Token endpoint; provider default when empty
    pub token_url: String,
}

/// Profile API base URLs, overridable for tests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoints {
    pub github_api_url: String,
    pub linkedin_api_url: String,
    pub google_api_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            github_api_url: "https://api.github.com".to_string(),
            linkedin_api_url: "https://api.linkedin.com".to_string(),
            google_api_url: "https://www.googleapis.com".to_string(),
        }
    }
}

/// Shared test account login (off by default)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TestingConfig {
    pub enabled: bool,
    pub username: String,
    pub password: Secret,
}

const SUPPORTED_CLOUDS: &[&str] = &["public", "government", "china"];

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Check values that would only fail later at request time.
    ///
    /// Missing vendor credentials are not an error here: the affected
    /// endpoints report a configuration failure when called.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::ValidationError("http.port must be non-zero".into()));
        }
        if self.http_client.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "http_client.timeout_ms must be non-zero".into(),
            ));
        }
        if !SUPPORTED_CLOUDS.contains(&self.graph.cloud.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "graph.cloud must be one of {:?}, got '{}'",
                SUPPORTED_CLOUDS, self.graph.cloud
            )));
        }
        if self.graph.mfa_extension_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "graph.mfa_extension_name must not be empty".into(),
            ));
        }
        if self.testing.enabled && self.testing.username.is_empty() {
            return Err(ConfigError::ValidationError(
                "testing.username is required when testing.enabled = true".into(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Policy Bridge Configuration
# Environment variables (POLICY_BRIDGE_*) override these settings

dev_mode = false

[http]
port = 8080
host = "0.0.0.0"
cors_origins = ["http://localhost:3000"]

[http_client]
timeout_ms = 10000
connect_timeout_ms = 5000
user_agent = "policy-bridge"

[auth0]
domain = "my-tenant.eu.auth0.com"
client_id = ""
client_secret = ""
audience = ""
connection = "Username-Password-Authentication"
base_url = ""  # overrides https://{domain}

[graph]
tenant_id = "my-tenant"
issuer_domain = ""  # defaults to {tenant_id}.onmicrosoft.com
client_id = ""
client_secret = ""
cloud = "public"  # public, government, china
login_base_url = ""
graph_base_url = ""
mfa_extension_name = "com.policybridge.mfa"

[oauth.google]
client_id = ""
client_secret = ""
token_url = ""

[oauth.linkedin]
client_id = ""
client_secret = ""
token_url = ""

[providers]
github_api_url = "https://api.github.com"
linkedin_api_url = "https://api.linkedin.com"
google_api_url = "https://www.googleapis.com"

[testing]
enabled = false
username = ""
password = ""
"#
        .to_string()
    }
}
