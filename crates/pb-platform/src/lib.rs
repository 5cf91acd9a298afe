//! Policy Bridge Platform
//!
//! Backend for an identity-platform migration:
//! - Pre-login migration flow from Auth0 into Azure AD B2C
//! - Auth0 and Microsoft Graph user management, including an MFA flag
//! - External profile lookup (GitHub, LinkedIn, Google)
//! - Canned API-connector errors and test-account token fetch
//!
//! ## Module Organization
//!
//! Each aggregate contains its client or service plus an `api` module with
//! the REST endpoints. `app` assembles the routers.

// Decision logic
pub mod migration;

// Identity back ends
pub mod directory;
pub mod legacy;

// Supporting APIs
pub mod policy;
pub mod profile;
pub mod testing;

// Shared infrastructure
pub mod app;
pub mod shared;

pub use shared::error::{PlatformError, Result};

pub use app::{build_router, AppServices};
pub use directory::{DirectoryError, GraphClient, MfaStatus, ProvisionedAccount};
pub use legacy::{Auth0Client, CredentialValidation, LegacyError};
pub use migration::{
    DirectoryProvider, LegacyIdentityProvider, MigrationError, MigrationFlow, MigrationOutcome,
};
pub use profile::{ExternalProfile, IdentityProvider, ProfileError, ProfileProvider, ProfileService};
pub use shared::api_common::UserSummary;
pub use shared::health_api::{health_router, HealthState};
pub use shared::token_cache::{TokenCache, TokenError};
pub use testing::CredentialLoginService;
