//! GitHub profile lookup

use async_trait::async_trait;
use pb_common::Secret;
use serde::Deserialize;

use super::{get_json, ExternalProfile, IdentityProvider, ProfileError, ProfileProvider};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    #[serde(default)]
    verified: bool,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    #[serde(default)]
    avatar_url: Option<String>,
}

pub struct GitHubProfileProvider {
    http: reqwest::Client,
    api_url: String,
}

impl GitHubProfileProvider {
    pub fn new(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.api_url, path))
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }
}

#[async_trait]
impl ProfileProvider for GitHubProfileProvider {
    fn provider(&self) -> IdentityProvider {
        IdentityProvider::GitHub
    }

    #[tracing::instrument(skip_all, name = "github_profile")]
    async fn fetch_profile(&self, token: &Secret) -> Result<ExternalProfile, ProfileError> {
        let provider = self.provider();

        let (emails, user) = tokio::try_join!(
            get_json::<Vec<GitHubEmail>>(provider, self.get("/user/emails"), token),
            get_json::<GitHubUser>(provider, self.get("/user"), token),
        )?;

        let email = emails
            .iter()
            .find(|e| e.verified)
            .or_else(|| emails.first())
            .map(|e| e.email.clone())
            .ok_or(ProfileError::MissingField {
                provider,
                field: "email",
            })?;

        let profile_image = user.avatar_url.ok_or(ProfileError::MissingField {
            provider,
            field: "avatar_url",
        })?;

        Ok(ExternalProfile {
            email,
            profile_image,
        })
    }
}
