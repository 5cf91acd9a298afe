//! External Profile Lookup
//!
//! Fetches email and avatar from a third-party OAuth provider using the
//! caller's access token.

pub mod api;
pub mod github;
pub mod google;
pub mod linkedin;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use pb_common::Secret;
use pb_config::ProviderEndpoints;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub use api::{external_user_data_router, ProfileState};
pub use github::GitHubProfileProvider;
pub use google::GoogleProfileProvider;
pub use linkedin::LinkedInProfileProvider;

/// Email and avatar from an external provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalProfile {
    pub email: String,
    pub profile_image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityProvider {
    GitHub,
    LinkedIn,
    Google,
}

impl IdentityProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::LinkedIn => "linkedin",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for IdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityProvider {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "github" => Ok(Self::GitHub),
            "linkedin" => Ok(Self::LinkedIn),
            "google" => Ok(Self::Google),
            _ => Err(ProfileError::UnsupportedProvider(s.to_string())),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Unsupported identity provider: {0}")]
    UnsupportedProvider(String),

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: IdentityProvider,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned {status}")]
    Api { provider: IdentityProvider, status: u16 },

    #[error("{provider} response is missing {field}")]
    MissingField {
        provider: IdentityProvider,
        field: &'static str,
    },
}

/// One external provider's profile endpoint(s)
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    fn provider(&self) -> IdentityProvider;

    async fn fetch_profile(&self, token: &Secret) -> Result<ExternalProfile, ProfileError>;
}

/// Dispatches profile lookups to the provider named by the caller
#[derive(Clone, Default)]
pub struct ProfileService {
    providers: HashMap<IdentityProvider, Arc<dyn ProfileProvider>>,
}

impl ProfileService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service with GitHub, LinkedIn and Google registered
    pub fn from_endpoints(http: reqwest::Client, endpoints: &ProviderEndpoints) -> Self {
        Self::new()
            .with_provider(Arc::new(GitHubProfileProvider::new(
                http.clone(),
                &endpoints.github_api_url,
            )))
            .with_provider(Arc::new(LinkedInProfileProvider::new(
                http.clone(),
                &endpoints.linkedin_api_url,
            )))
            .with_provider(Arc::new(GoogleProfileProvider::new(
                http,
                &endpoints.google_api_url,
            )))
    }

    pub fn with_provider(mut self, provider: Arc<dyn ProfileProvider>) -> Self {
        self.providers.insert(provider.provider(), provider);
        self
    }

    /// Fetch the profile from `provider` (case-insensitive name).
    pub async fn fetch_profile(&self, provider: &str, token: &Secret) -> Result<ExternalProfile, ProfileError> {
        let kind: IdentityProvider = provider.parse()?;
        let handler = self
            .providers
            .get(&kind)
            .ok_or_else(|| ProfileError::UnsupportedProvider(provider.to_string()))?;

        handler.fetch_profile(token).await
    }
}

/// Send a bearer-authenticated GET and decode the JSON body.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    provider: IdentityProvider,
    request: reqwest::RequestBuilder,
    token: &Secret,
) -> Result<T, ProfileError> {
    let transport = |source| ProfileError::Transport { provider, source };

    let response = request.bearer_auth(token.expose()).send().await.map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProfileError::Api {
            provider,
            status: status.as_u16(),
        });
    }

    response.json::<T>().await.map_err(transport)
}
