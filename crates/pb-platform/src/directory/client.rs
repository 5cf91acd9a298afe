//! Microsoft Graph client for directory users and the MFA open extension.

use async_trait::async_trait;
use pb_common::{mask_identifier, Secret};
use pb_config::GraphConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::entity::{AzureCloud, GraphUser, GraphUserList, MfaExtension, MfaStatus, ProvisionedAccount};
use super::mfa::generate_totp_secret;
use super::DirectoryError;
use crate::migration::DirectoryProvider;
use crate::shared::api_common::UserSummary;
use crate::shared::http::error_body;
use crate::shared::token_cache::{request_token, TokenCache};

const OPEN_EXTENSION_TYPE: &str = "#microsoft.graph.openTypeExtension";

pub struct GraphClient {
    http: reqwest::Client,
    config: GraphConfig,
    cloud: AzureCloud,
    tokens: TokenCache,
}

impl GraphClient {
    pub fn new(http: reqwest::Client, config: GraphConfig) -> Self {
        let cloud = AzureCloud::from_name(&config.cloud).unwrap_or_default();
        Self {
            http,
            config,
            cloud,
            tokens: TokenCache::new("graph-app"),
        }
    }

    /// Whether tenant and app credentials are present
    pub fn is_configured(&self) -> bool {
        self.tenant_id().is_ok() && self.client_credentials().is_ok()
    }

    fn tenant_id(&self) -> Result<&str, DirectoryError> {
        let tenant = self.config.tenant_id.trim();
        if tenant.is_empty() {
            return Err(DirectoryError::Configuration("graph.tenant_id is not set".into()));
        }
        Ok(tenant)
    }

    fn client_credentials(&self) -> Result<(&str, &Secret), DirectoryError> {
        if self.config.client_id.trim().is_empty() {
            return Err(DirectoryError::Configuration("graph.client_id is not set".into()));
        }
        if self.config.client_secret.is_empty() {
            return Err(DirectoryError::Configuration("graph.client_secret is not set".into()));
        }
        Ok((&self.config.client_id, &self.config.client_secret))
    }

    fn login_base(&self) -> &str {
        match self.config.login_base_url.trim_end_matches('/') {
            "" => self.cloud.login_url(),
            url => url,
        }
    }

    fn graph_base(&self) -> &str {
        match self.config.graph_base_url.trim_end_matches('/') {
            "" => self.cloud.graph_url(),
            url => url,
        }
    }

    /// Issuer of `emailAddress` identities in this tenant.
    ///
    /// `graph.issuer_domain` wins; otherwise a bare tenant name gets
    /// `.onmicrosoft.com` appended.
    pub fn issuer(&self) -> Result<String, DirectoryError> {
        let configured = self.config.issuer_domain.trim();
        if !configured.is_empty() {
            return Ok(configured.to_string());
        }

        let tenant = self.tenant_id()?;
        if tenant.contains('.') {
            Ok(tenant.to_string())
        } else {
            Ok(format!("{}.onmicrosoft.com", tenant))
        }
    }

    async fn app_token(&self) -> Result<Secret, DirectoryError> {
        let tenant = self.tenant_id()?;
        let (client_id, client_secret) = self.client_credentials()?;

        let url = format!("{}/{}/oauth2/v2.0/token", self.login_base(), tenant);
        let scope = format!("{}/.default", self.cloud.graph_url());
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret.expose()),
            ("scope", scope.as_str()),
        ];

        let token = self
            .tokens
            .get_or_refresh(|| request_token(self.http.post(&url).form(&form)))
            .await?;
        Ok(token)
    }

    async fn ensure_success(&self, response: reqwest::Response) -> Result<reqwest::Response, DirectoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
        }
        Err(DirectoryError::Api {
            status: status.as_u16(),
            body: error_body(response).await,
        })
    }

    async fn find_user(&self, email: &str) -> Result<Option<GraphUser>, DirectoryError> {
        let issuer = self.issuer()?;
        let token = self.app_token().await?;

        let escaped = email.replace('\'', "''");
        let filter = format!(
            "identities/any(id:id/issuerAssignedId eq '{}' and id/issuer eq '{}')",
            escaped, issuer
        );

        let response = self
            .http
            .get(format!("{}/v1.0/users", self.graph_base()))
            .bearer_auth(token.expose())
            .query(&[
                ("$filter", filter.as_str()),
                ("$top", "1"),
                ("$select", "id,displayName,accountEnabled,mail,identities"),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = self.ensure_success(response).await?;

        let list: GraphUserList = response
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;
        Ok(list.value.into_iter().next())
    }

    async fn require_user_id(&self, email: &str) -> Result<String, DirectoryError> {
        self.find_user(email)
            .await?
            .map(|user| user.id)
            .ok_or_else(|| DirectoryError::UserNotFound(email.to_string()))
    }

    /// Look up a user by `emailAddress` identity. No match is `Ok(None)`.
    #[tracing::instrument(skip_all, fields(email = %mask_identifier(email)))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserSummary>, DirectoryError> {
        Ok(self.find_user(email).await?.map(UserSummary::from))
    }

    /// Create a local account signing in with `email`.
    ///
    /// `Ok(None)` when Graph answers success without an object id.
    #[tracing::instrument(skip_all, fields(email = %mask_identifier(email)))]
    pub async fn create_user(
        &self,
        email: &str,
        password: &Secret,
    ) -> Result<Option<ProvisionedAccount>, DirectoryError> {
        let issuer = self.issuer()?;
        let token = self.app_token().await?;

        let body = json!({
            "accountEnabled": true,
            "displayName": email,
            "mailNickname": mail_nickname(email),
            "identities": [{
                "signInType": "emailAddress",
                "issuer": issuer,
                "issuerAssignedId": email,
            }],
            "passwordProfile": {
                "forceChangePasswordNextSignIn": false,
                "password": password.expose(),
            },
            "passwordPolicies": "DisablePasswordExpiration",
        });

        let response = self
            .http
            .post(format!("{}/v1.0/users", self.graph_base()))
            .bearer_auth(token.expose())
            .json(&body)
            .send()
            .await?;
        let response = self.ensure_success(response).await?;

        let user: GraphUser = response
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;

        if user.id.is_empty() {
            return Ok(None);
        }

        info!(account_id = %user.id, "Created directory user");
        Ok(Some(ProvisionedAccount {
            identifier: email.to_string(),
            account_id: user.id,
        }))
    }

    /// Delete the user with this email. Returns `false` if there is none.
    #[tracing::instrument(skip_all, fields(email = %mask_identifier(email)))]
    pub async fn delete_user_by_email(&self, email: &str) -> Result<bool, DirectoryError> {
        let user = match self.find_user(email).await? {
            Some(user) => user,
            None => return Ok(false),
        };
        let token = self.app_token().await?;

        let response = self
            .http
            .delete(format!("{}/v1.0/users/{}", self.graph_base(), user.id))
            .bearer_auth(token.expose())
            .send()
            .await?;
        self.ensure_success(response).await?;

        info!(account_id = %user.id, "Deleted directory user");
        Ok(true)
    }

    fn extension_url(&self, user_id: &str) -> String {
        format!(
            "{}/v1.0/users/{}/extensions/{}",
            self.graph_base(),
            user_id,
            self.config.mfa_extension_name
        )
    }

    async fn get_extension(&self, user_id: &str) -> Result<Option<MfaExtension>, DirectoryError> {
        let token = self.app_token().await?;

        let response = self
            .http
            .get(self.extension_url(user_id))
            .bearer_auth(token.expose())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = self.ensure_success(response).await?;

        let extension = response
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))?;
        Ok(Some(extension))
    }

    async fn write_extension(&self, user_id: &str, exists: bool, mut body: Value) -> Result<(), DirectoryError> {
        let token = self.app_token().await?;
        body["@odata.type"] = json!(OPEN_EXTENSION_TYPE);

        let request = if exists {
            self.http.patch(self.extension_url(user_id))
        } else {
            body["extensionName"] = json!(self.config.mfa_extension_name);
            self.http
                .post(format!("{}/v1.0/users/{}/extensions", self.graph_base(), user_id))
        };

        let response = request.bearer_auth(token.expose()).json(&body).send().await?;
        self.ensure_success(response).await?;
        Ok(())
    }

    /// Turn MFA on. An already enrolled TOTP secret is kept.
    #[tracing::instrument(skip_all, fields(email = %mask_identifier(email)))]
    pub async fn enable_mfa(&self, email: &str) -> Result<MfaStatus, DirectoryError> {
        let user_id = self.require_user_id(email).await?;
        let existing = self.get_extension(&user_id).await?;

        let secret = existing
            .as_ref()
            .and_then(|ext| ext.totp_secret.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(generate_totp_secret);

        self.write_extension(
            &user_id,
            existing.is_some(),
            json!({ "mfaEnabled": true, "totpSecret": secret }),
        )
        .await?;

        info!("MFA enabled");
        Ok(MfaStatus { mfa_enabled: true })
    }

    /// Turn MFA off and discard the TOTP secret.
    #[tracing::instrument(skip_all, fields(email = %mask_identifier(email)))]
    pub async fn disable_mfa(&self, email: &str) -> Result<MfaStatus, DirectoryError> {
        let user_id = self.require_user_id(email).await?;

        if self.get_extension(&user_id).await?.is_some() {
            self.write_extension(
                &user_id,
                true,
                json!({ "mfaEnabled": false, "totpSecret": null }),
            )
            .await?;
            info!("MFA disabled");
        } else {
            debug!("No MFA extension present, nothing to disable");
        }

        Ok(MfaStatus { mfa_enabled: false })
    }

    /// Read the MFA flag; a missing extension means disabled.
    #[tracing::instrument(skip_all, fields(email = %mask_identifier(email)))]
    pub async fn get_mfa_status(&self, email: &str) -> Result<MfaStatus, DirectoryError> {
        let user_id = self.require_user_id(email).await?;
        let enabled = self
            .get_extension(&user_id)
            .await?
            .map(|ext| ext.mfa_enabled)
            .unwrap_or(false);

        Ok(MfaStatus { mfa_enabled: enabled })
    }
}

#[async_trait]
impl DirectoryProvider for GraphClient {
    async fn user_exists(&self, identifier: &str) -> Result<bool, DirectoryError> {
        Ok(self.find_user(identifier).await?.is_some())
    }

    async fn create_user(
        &self,
        identifier: &str,
        secret: &Secret,
    ) -> Result<Option<ProvisionedAccount>, DirectoryError> {
        GraphClient::create_user(self, identifier, secret).await
    }
}

/// Graph `mailNickname` from the local part of an email.
fn mail_nickname(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let nickname: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    if nickname.is_empty() {
        "user".to_string()
    } else {
        nickname
    }
}
