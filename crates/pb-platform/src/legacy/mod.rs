//! Legacy Identity Provider (Auth0)
//!
//! - `entity` - Auth0 payloads and credential validation results
//! - `client` - Authentication API and Management API v2 client
//! - `api` - REST endpoints under `/api/auth0-users`

pub mod api;
pub mod client;
pub mod entity;

use thiserror::Error;

use crate::shared::error::PlatformError;
use crate::shared::token_cache::TokenError;

pub use api::{auth0_users_router, Auth0UsersState};
pub use client::Auth0Client;
pub use entity::{Auth0User, CredentialValidation};

#[derive(Error, Debug)]
pub enum LegacyError {
    #[error("Auth0 is not configured: {0}")]
    Configuration(String),

    #[error("Auth0 token error: {0}")]
    Token(#[from] TokenError),

    #[error("Auth0 request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Auth0 returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected Auth0 response: {0}")]
    Decode(String),
}

impl From<LegacyError> for PlatformError {
    fn from(err: LegacyError) -> Self {
        match err {
            LegacyError::Configuration(message) => PlatformError::configuration(message),
            other => PlatformError::upstream("auth0", other.to_string()),
        }
    }
}
