//! Canned API-connector error payloads
//!
//! Fixed responses for wiring and testing custom policy error handling.

pub mod api;

use serde::Serialize;
use utoipa::ToSchema;

pub use api::{error_messages_router, PolicyErrorPlain};

use crate::migration::api::POLICY_RESPONSE_VERSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyErrorKind {
    UserAlreadyExists,
    InvalidPassword,
    ServerError,
}

impl PolicyErrorKind {
    pub fn status(&self) -> u16 {
        match self {
            Self::UserAlreadyExists | Self::InvalidPassword => 400,
            Self::ServerError => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::UserAlreadyExists => "UserAlreadyExists",
            Self::InvalidPassword => "InvalidPassword",
            Self::ServerError => "ServerError",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UserAlreadyExists => "A user with this email address already exists.",
            Self::InvalidPassword => "The password provided does not meet complexity requirements.",
            Self::ServerError => "An unexpected server error occurred.",
        }
    }
}

/// Versioned API-connector error body
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyErrorResponse {
    pub version: String,
    pub status: u16,
    pub code: String,
    pub user_message: String,
}

impl From<PolicyErrorKind> for PolicyErrorResponse {
    fn from(kind: PolicyErrorKind) -> Self {
        Self {
            version: POLICY_RESPONSE_VERSION.to_string(),
            status: kind.status(),
            code: kind.code().to_string(),
            user_message: kind.user_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_shape() {
        let json = serde_json::to_value(PolicyErrorResponse::from(PolicyErrorKind::ServerError)).unwrap();
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["status"], 500);
        assert_eq!(json["code"], "ServerError");
        assert_eq!(json["userMessage"], "An unexpected server error occurred.");
    }

    #[test]
    fn test_status_per_kind() {
        assert_eq!(PolicyErrorKind::UserAlreadyExists.status(), 400);
        assert_eq!(PolicyErrorKind::InvalidPassword.status(), 400);
        assert_eq!(PolicyErrorKind::ServerError.status(), 500);
    }
}
