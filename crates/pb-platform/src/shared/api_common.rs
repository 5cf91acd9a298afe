//! Common API types shared by the user endpoints

use pb_common::Secret;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User as returned by either identity back end.
///
/// Vendor payloads are mapped into this shape so handlers never expose
/// Auth0 or Graph JSON directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Vendor object id (Auth0 `user_id`, Graph object id)
    pub id: String,
    /// Sign-in identifier (email)
    pub identifier: String,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Email + password body used by create and validate endpoints
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub email: String,
    #[schema(value_type = String)]
    pub password: Secret,
}

/// Plain `{ message }` body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_summary_serialization() {
        let user = UserSummary {
            id: "auth0|123".into(),
            identifier: "a@x.com".into(),
            verified: true,
            display_name: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], "auth0|123");
        assert_eq!(json["verified"], true);
        assert!(json.get("displayName").is_none());
    }

    #[test]
    fn test_credentials_request_hides_password() {
        let req: CredentialsRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"Pw1!"}"#).unwrap();
        assert_eq!(req.password.expose(), "Pw1!");
        assert!(!format!("{:?}", req).contains("Pw1!"));
    }
}
