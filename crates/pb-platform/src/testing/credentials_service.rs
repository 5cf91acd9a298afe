//! Password-grant token fetch for the shared test account

use std::fmt;
use std::str::FromStr;

use pb_common::Secret;
use pb_config::{Auth0Config, OAuthClientConfig, OAuthConfig, TestingConfig};
use thiserror::Error;
use tracing::info;

use crate::shared::token_cache::{request_token, TokenError};

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const LINKEDIN_TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestProvider {
    Google,
    LinkedIn,
    Auth0,
}

impl FromStr for TestProvider {
    type Err = TestLoginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "linkedin" => Ok(Self::LinkedIn),
            "auth0" => Ok(Self::Auth0),
            _ => Err(TestLoginError::Unsupported(s.to_string())),
        }
    }
}

impl fmt::Display for TestProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Google => "google",
            Self::LinkedIn => "linkedin",
            Self::Auth0 => "auth0",
        })
    }
}

#[derive(Error, Debug)]
pub enum TestLoginError {
    #[error("Unsupported provider: {0}")]
    Unsupported(String),

    #[error("Missing configuration: {0}")]
    MissingCredentials(&'static str),

    #[error("Token request failed: {0}")]
    Token(#[from] TokenError),
}

pub struct CredentialLoginService {
    http: reqwest::Client,
    auth0: Auth0Config,
    oauth: OAuthConfig,
    testing: TestingConfig,
}

impl CredentialLoginService {
    pub fn new(
        http: reqwest::Client,
        auth0: Auth0Config,
        oauth: OAuthConfig,
        testing: TestingConfig,
    ) -> Self {
        Self {
            http,
            auth0,
            oauth,
            testing,
        }
    }

    fn oauth_client(client: &OAuthClientConfig, name: &'static str) -> Result<(String, Secret), TestLoginError> {
        if client.client_id.is_empty() || client.client_secret.is_empty() {
            return Err(TestLoginError::MissingCredentials(name));
        }
        Ok((client.client_id.clone(), client.client_secret.clone()))
    }

    /// Token URL, client credentials, and scope for `provider`
    fn endpoint(
        &self,
        provider: TestProvider,
    ) -> Result<(String, String, Secret, Option<&'static str>), TestLoginError> {
        match provider {
            TestProvider::Google => {
                let (id, secret) = Self::oauth_client(&self.oauth.google, "oauth.google")?;
                let url = non_empty_or(&self.oauth.google.token_url, GOOGLE_TOKEN_URL);
                Ok((url, id, secret, Some("openid email")))
            }
            TestProvider::LinkedIn => {
                let (id, secret) = Self::oauth_client(&self.oauth.linkedin, "oauth.linkedin")?;
                let url = non_empty_or(&self.oauth.linkedin.token_url, LINKEDIN_TOKEN_URL);
                Ok((url, id, secret, None))
            }
            TestProvider::Auth0 => {
                if self.auth0.domain.is_empty() && self.auth0.base_url.is_empty() {
                    return Err(TestLoginError::MissingCredentials("auth0.domain"));
                }
                if self.auth0.client_id.is_empty() || self.auth0.client_secret.is_empty() {
                    return Err(TestLoginError::MissingCredentials("auth0.client_id/client_secret"));
                }
                let url = format!("{}/oauth/token", self.auth0.effective_base_url());
                Ok((
                    url,
                    self.auth0.client_id.clone(),
                    self.auth0.client_secret.clone(),
                    Some("openid"),
                ))
            }
        }
    }

    /// Log the test account in at `provider` and return its access token.
    #[tracing::instrument(skip(self))]
    pub async fn get_access_token(&self, provider: &str) -> Result<Secret, TestLoginError> {
        let provider: TestProvider = provider.parse()?;

        if self.testing.username.is_empty() || self.testing.password.is_empty() {
            return Err(TestLoginError::MissingCredentials("testing.username/password"));
        }

        let (url, client_id, client_secret, scope) = self.endpoint(provider)?;

        let mut form = vec![
            ("grant_type", "password"),
            ("username", self.testing.username.as_str()),
            ("password", self.testing.password.expose()),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.expose()),
        ];
        if let Some(scope) = scope {
            form.push(("scope", scope));
        }

        let token = request_token(self.http.post(&url).form(&form)).await?;
        info!(%provider, "Fetched test account token");
        Ok(token.access_token)
    }
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(testing: TestingConfig) -> CredentialLoginService {
        CredentialLoginService::new(
            reqwest::Client::new(),
            Auth0Config::default(),
            OAuthConfig::default(),
            testing,
        )
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("Google".parse::<TestProvider>().unwrap(), TestProvider::Google);
        assert_eq!("AUTH0".parse::<TestProvider>().unwrap(), TestProvider::Auth0);
        assert!(matches!(
            "github".parse::<TestProvider>(),
            Err(TestLoginError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_test_account() {
        let result = service(TestingConfig::default()).get_access_token("google").await;
        assert!(matches!(result, Err(TestLoginError::MissingCredentials(_))));
    }

    #[tokio::test]
    async fn test_missing_client_registration() {
        let result = service(TestingConfig {
            enabled: true,
            username: "tester@example.com".into(),
            password: Secret::new("pw"),
        })
        .get_access_token("linkedin")
        .await;
        assert!(matches!(result, Err(TestLoginError::MissingCredentials("oauth.linkedin"))));
    }
}
