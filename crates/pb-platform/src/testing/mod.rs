//! Test Credential Login
//!
//! Fetches access tokens for a shared test account with the password grant,
//! so policy flows can be exercised without a browser. Only mounted when
//! `testing.enabled` is set.

pub mod api;
pub mod credentials_service;

pub use api::{oauth_credentials_router, TestingState};
pub use credentials_service::{CredentialLoginService, TestLoginError, TestProvider};
