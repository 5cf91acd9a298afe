//! Google profile lookup (OpenID Connect userinfo)

use async_trait::async_trait;
use pb_common::Secret;
use serde::Deserialize;

use super::{get_json, ExternalProfile, IdentityProvider, ProfileError, ProfileProvider};

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

pub struct GoogleProfileProvider {
    http: reqwest::Client,
    api_url: String,
}

impl GoogleProfileProvider {
    pub fn new(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ProfileProvider for GoogleProfileProvider {
    fn provider(&self) -> IdentityProvider {
        IdentityProvider::Google
    }

    #[tracing::instrument(skip_all, name = "google_profile")]
    async fn fetch_profile(&self, token: &Secret) -> Result<ExternalProfile, ProfileError> {
        let provider = self.provider();
        let request = self.http.get(format!("{}/oauth2/v3/userinfo", self.api_url));
        let info: GoogleUserInfo = get_json(provider, request, token).await?;

        Ok(ExternalProfile {
            email: info.email.ok_or(ProfileError::MissingField {
                provider,
                field: "email",
            })?,
            profile_image: info.picture.ok_or(ProfileError::MissingField {
                provider,
                field: "picture",
            })?,
        })
    }
}
