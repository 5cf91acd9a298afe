//! Auth0 payloads

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::api_common::UserSummary;

/// User object from the Auth0 Management API
#[derive(Debug, Clone, Deserialize)]
pub struct Auth0User {
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<Auth0User> for UserSummary {
    fn from(user: Auth0User) -> Self {
        Self {
            id: user.user_id,
            identifier: user.email,
            verified: user.email_verified,
            display_name: user.name,
        }
    }
}

/// Outcome of a password-grant check against the legacy provider.
///
/// `status_code` is the token endpoint's HTTP status, or 500 when the
/// endpoint could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialValidation {
    pub valid: bool,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl CredentialValidation {
    pub fn accepted(status_code: u16) -> Self {
        Self {
            valid: true,
            status_code,
            error_detail: None,
        }
    }

    pub fn rejected(status_code: u16, detail: impl Into<String>) -> Self {
        Self {
            valid: false,
            status_code,
            error_detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth0_user_into_summary() {
        let user: Auth0User = serde_json::from_str(
            r#"{"user_id":"auth0|abc","email":"a@x.com","email_verified":true,"name":"Alice","logins_count":4}"#,
        )
        .unwrap();

        let summary: UserSummary = user.into();
        assert_eq!(summary.id, "auth0|abc");
        assert_eq!(summary.identifier, "a@x.com");
        assert!(summary.verified);
        assert_eq!(summary.display_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_validation_serialization() {
        let json = serde_json::to_value(CredentialValidation::rejected(403, "invalid_grant")).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["statusCode"], 403);
        assert_eq!(json["errorDetail"], "invalid_grant");

        let ok = serde_json::to_value(CredentialValidation::accepted(200)).unwrap();
        assert!(ok.get("errorDetail").is_none());
    }
}
