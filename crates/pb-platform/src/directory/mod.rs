//! New Directory (Azure AD B2C via Microsoft Graph)
//!
//! - `entity` - Graph payloads, cloud endpoints, MFA extension
//! - `mfa` - TOTP secret generation
//! - `client` - Graph users and open extensions
//! - `api` - REST endpoints under `/api/graph-users`

pub mod api;
pub mod client;
pub mod entity;
pub mod mfa;

use thiserror::Error;

use crate::shared::error::PlatformError;
use crate::shared::token_cache::TokenError;

pub use api::{graph_users_router, GraphUsersState};
pub use client::GraphClient;
pub use entity::{AzureCloud, GraphUser, MfaExtension, MfaStatus, ProvisionedAccount};

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Microsoft Graph is not configured: {0}")]
    Configuration(String),

    #[error("Microsoft Graph token error: {0}")]
    Token(#[from] TokenError),

    #[error("Microsoft Graph request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Microsoft Graph returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected Microsoft Graph response: {0}")]
    Decode(String),

    #[error("User not found in directory: {0}")]
    UserNotFound(String),
}

impl From<DirectoryError> for PlatformError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Configuration(message) => PlatformError::configuration(message),
            DirectoryError::UserNotFound(email) => PlatformError::not_found("GraphUser", email),
            other => PlatformError::upstream("graph", other.to_string()),
        }
    }
}
