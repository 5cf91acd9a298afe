//! Auth0 Authentication API and Management API v2 client.

use async_trait::async_trait;
use pb_common::{mask_identifier, Secret};
use pb_config::Auth0Config;
use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, info, warn};

use super::entity::{Auth0User, CredentialValidation};
use super::LegacyError;
use crate::migration::LegacyIdentityProvider;
use crate::shared::api_common::UserSummary;
use crate::shared::http::error_body;
use crate::shared::token_cache::{request_token, TokenCache};

pub struct Auth0Client {
    http: reqwest::Client,
    config: Auth0Config,
    tokens: TokenCache,
}

impl Auth0Client {
    pub fn new(http: reqwest::Client, config: Auth0Config) -> Self {
        Self {
            http,
            config,
            tokens: TokenCache::new("auth0-management"),
        }
    }

    /// Whether the tenant and client credentials are present
    pub fn is_configured(&self) -> bool {
        self.base_url().is_ok() && self.client_credentials().is_ok()
    }

    fn base_url(&self) -> Result<String, LegacyError> {
        if self.config.domain.trim().is_empty() && self.config.base_url.trim().is_empty() {
            return Err(LegacyError::Configuration("auth0.domain is not set".into()));
        }
        Ok(self.config.effective_base_url())
    }

    fn client_credentials(&self) -> Result<(&str, &Secret), LegacyError> {
        if self.config.client_id.trim().is_empty() {
            return Err(LegacyError::Configuration("auth0.client_id is not set".into()));
        }
        if self.config.client_secret.is_empty() {
            return Err(LegacyError::Configuration("auth0.client_secret is not set".into()));
        }
        Ok((&self.config.client_id, &self.config.client_secret))
    }

    fn management_audience(&self, base_url: &str) -> String {
        if self.config.domain.trim().is_empty() {
            format!("{}/api/v2/", base_url)
        } else {
            format!("https://{}/api/v2/", self.config.domain.trim_end_matches('/'))
        }
    }

    async fn management_token(&self) -> Result<Secret, LegacyError> {
        let base_url = self.base_url()?;
        let (client_id, client_secret) = self.client_credentials()?;

        let body = json!({
            "grant_type": "client_credentials",
            "client_id": client_id,
            "client_secret": client_secret.expose(),
            "audience": self.management_audience(&base_url),
        });
        let url = format!("{}/oauth/token", base_url);

        let token = self
            .tokens
            .get_or_refresh(|| request_token(self.http.post(&url).json(&body)))
            .await?;
        Ok(token)
    }

    /// Turn a non-success response into an error, dropping the cached
    /// token when Auth0 rejects it.
    async fn ensure_success(&self, response: reqwest::Response) -> Result<reqwest::Response, LegacyError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
        }
        Err(LegacyError::Api {
            status: status.as_u16(),
            body: error_body(response).await,
        })
    }

    /// Look up a user by email. No match (empty list or 404) is `Ok(None)`.
    #[tracing::instrument(skip_all, fields(email = %mask_identifier(email)))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserSummary>, LegacyError> {
        let base_url = self.base_url()?;
        let token = self.management_token().await?;

        let response = self
            .http
            .get(format!("{}/api/v2/users-by-email", base_url))
            .bearer_auth(token.expose())
            .query(&[("email", email)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = self.ensure_success(response).await?;

        let users: Vec<Auth0User> = response
            .json()
            .await
            .map_err(|e| LegacyError::Decode(e.to_string()))?;

        debug!(matches = users.len(), "Auth0 users-by-email lookup");
        Ok(users.into_iter().next().map(UserSummary::from))
    }

    /// Check a password with the resource-owner password grant.
    ///
    /// Rejections and unreachable endpoints are reported in the result, not
    /// as errors; only missing configuration is an `Err`.
    #[tracing::instrument(skip_all, fields(email = %mask_identifier(email)))]
    pub async fn validate_credentials(
        &self,
        email: &str,
        password: &Secret,
    ) -> Result<CredentialValidation, LegacyError> {
        let base_url = self.base_url()?;
        let (client_id, client_secret) = self.client_credentials()?;

        let mut body = json!({
            "grant_type": "password",
            "username": email,
            "password": password.expose(),
            "client_id": client_id,
            "client_secret": client_secret.expose(),
            "scope": "openid",
        });
        if !self.config.audience.is_empty() {
            body["audience"] = json!(self.config.audience);
        }

        let response = match self
            .http
            .post(format!("{}/oauth/token", base_url))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Auth0 token endpoint unreachable");
                return Ok(CredentialValidation::rejected(500, e.to_string()));
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(CredentialValidation::accepted(status.as_u16()));
        }

        let detail = error_body(response).await;
        debug!(status = status.as_u16(), "Auth0 rejected password grant");
        Ok(CredentialValidation::rejected(status.as_u16(), detail))
    }

    /// Create a database-connection user.
    #[tracing::instrument(skip_all, fields(email = %mask_identifier(email)))]
    pub async fn create_user(&self, email: &str, password: &Secret) -> Result<UserSummary, LegacyError> {
        let base_url = self.base_url()?;
        let token = self.management_token().await?;

        let body = json!({
            "email": email,
            "password": password.expose(),
            "connection": self.config.connection,
            "email_verified": false,
            "app_metadata": { "role": "user" },
        });

        let response = self
            .http
            .post(format!("{}/api/v2/users", base_url))
            .bearer_auth(token.expose())
            .json(&body)
            .send()
            .await?;
        let response = self.ensure_success(response).await?;

        let user: Auth0User = response
            .json()
            .await
            .map_err(|e| LegacyError::Decode(e.to_string()))?;

        info!(user_id = %user.user_id, "Created Auth0 user");
        Ok(user.into())
    }

    /// Delete the user with this email. Returns `false` if there is none.
    #[tracing::instrument(skip_all, fields(email = %mask_identifier(email)))]
    pub async fn delete_user_by_email(&self, email: &str) -> Result<bool, LegacyError> {
        let user = match self.get_user_by_email(email).await? {
            Some(user) => user,
            None => return Ok(false),
        };

        let base_url = self.base_url()?;
        let token = self.management_token().await?;

        let response = self
            .http
            .delete(format!(
                "{}/api/v2/users/{}",
                base_url,
                urlencoding::encode(&user.id)
            ))
            .bearer_auth(token.expose())
            .send()
            .await?;
        self.ensure_success(response).await?;

        info!(user_id = %user.id, "Deleted Auth0 user");
        Ok(true)
    }
}

#[async_trait]
impl LegacyIdentityProvider for Auth0Client {
    async fn user_exists(&self, identifier: &str) -> Result<bool, LegacyError> {
        Ok(self.get_user_by_email(identifier).await?.is_some())
    }

    async fn validate_credentials(
        &self,
        identifier: &str,
        secret: &Secret,
    ) -> Result<CredentialValidation, LegacyError> {
        Auth0Client::validate_credentials(self, identifier, secret).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(config: Auth0Config) -> Auth0Client {
        Auth0Client::new(reqwest::Client::new(), config)
    }

    #[test]
    fn test_unconfigured_client() {
        let client = client(Auth0Config::default());
        assert!(!client.is_configured());
        assert!(matches!(client.base_url(), Err(LegacyError::Configuration(_))));
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let client = client(Auth0Config {
            domain: "tenant.auth0.com".into(),
            client_id: "id".into(),
            ..Default::default()
        });
        assert!(!client.is_configured());
        assert!(matches!(
            client.client_credentials(),
            Err(LegacyError::Configuration(msg)) if msg.contains("client_secret")
        ));
    }

    #[test]
    fn test_management_audience_uses_domain() {
        let client = client(Auth0Config {
            domain: "tenant.auth0.com".into(),
            base_url: "http://127.0.0.1:4010".into(),
            ..Default::default()
        });
        assert_eq!(
            client.management_audience("http://127.0.0.1:4010"),
            "https://tenant.auth0.com/api/v2/"
        );
    }

    #[tokio::test]
    async fn test_validate_without_config_is_error() {
        let client = client(Auth0Config::default());
        let result = client
            .validate_credentials("a@x.com", &Secret::new("pw"))
            .await;
        assert!(matches!(result, Err(LegacyError::Configuration(_))));
    }
}
