//! Microsoft Graph payloads

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::api_common::UserSummary;

/// Azure cloud environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AzureCloud {
    #[default]
    Public,
    Government,
    China,
}

impl AzureCloud {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "public" | "" => Some(Self::Public),
            "government" => Some(Self::Government),
            "china" => Some(Self::China),
            _ => None,
        }
    }

    /// Login (token) host for this cloud
    pub fn login_url(&self) -> &'static str {
        match self {
            Self::Public => "https://login.microsoftonline.com",
            Self::Government => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
        }
    }

    /// Graph API host for this cloud
    pub fn graph_url(&self) -> &'static str {
        match self {
            Self::Public => "https://graph.microsoft.com",
            Self::Government => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
        }
    }
}

/// Sign-in identity attached to a directory user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectIdentity {
    #[serde(default)]
    pub sign_in_type: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub issuer_assigned_id: Option<String>,
}

/// Directory user (subset of Graph `user`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub account_enabled: Option<bool>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub identities: Vec<ObjectIdentity>,
}

impl GraphUser {
    /// The `emailAddress` sign-in identity, if any
    pub fn email_identity(&self) -> Option<&str> {
        self.identities
            .iter()
            .find(|i| i.sign_in_type.as_deref() == Some("emailAddress"))
            .and_then(|i| i.issuer_assigned_id.as_deref())
    }
}

/// Graph has no email-verified flag; an enabled account counts as verified.
impl From<GraphUser> for UserSummary {
    fn from(user: GraphUser) -> Self {
        let identifier = user
            .email_identity()
            .map(str::to_string)
            .or_else(|| user.mail.clone())
            .unwrap_or_default();

        Self {
            id: user.id,
            identifier,
            verified: user.account_enabled.unwrap_or(false),
            display_name: user.display_name,
        }
    }
}

/// Collection wrapper for `GET /users`
#[derive(Debug, Deserialize)]
pub struct GraphUserList {
    #[serde(default)]
    pub value: Vec<GraphUser>,
}

/// Account created in the directory during migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedAccount {
    pub identifier: String,
    /// Directory object id
    pub account_id: String,
}

/// Open extension holding the MFA flag and TOTP seed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MfaExtension {
    #[serde(default)]
    pub extension_name: Option<String>,
    #[serde(default)]
    pub mfa_enabled: bool,
    #[serde(default)]
    pub totp_secret: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MfaStatus {
    pub mfa_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_from_name() {
        assert_eq!(AzureCloud::from_name("public"), Some(AzureCloud::Public));
        assert_eq!(AzureCloud::from_name("Government"), Some(AzureCloud::Government));
        assert_eq!(AzureCloud::from_name("china"), Some(AzureCloud::China));
        assert_eq!(AzureCloud::from_name("germany"), None);
        assert_eq!(AzureCloud::China.graph_url(), "https://microsoftgraph.chinacloudapi.cn");
    }

    #[test]
    fn test_graph_user_into_summary() {
        let user: GraphUser = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000001",
                "displayName": "a@x.com",
                "accountEnabled": true,
                "identities": [
                    {"signInType": "userPrincipalName", "issuer": "contoso.onmicrosoft.com", "issuerAssignedId": "abc@contoso.onmicrosoft.com"},
                    {"signInType": "emailAddress", "issuer": "contoso.onmicrosoft.com", "issuerAssignedId": "a@x.com"}
                ]
            }"#,
        )
        .unwrap();

        let summary: UserSummary = user.into();
        assert_eq!(summary.identifier, "a@x.com");
        assert!(summary.verified);
        assert_eq!(summary.id, "00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn test_mfa_extension_defaults() {
        let ext: MfaExtension =
            serde_json::from_str(r#"{"extensionName":"com.policybridge.mfa"}"#).unwrap();
        assert!(!ext.mfa_enabled);
        assert!(ext.totp_secret.is_none());
    }
}
