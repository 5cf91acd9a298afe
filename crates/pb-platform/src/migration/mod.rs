//! Migration Aggregate
//!
//! Decides, per sign-in attempt, whether a user can continue in the new
//! directory, must be provisioned there from the legacy provider, or is
//! rejected.

pub mod api;
pub mod flow;

pub use api::{
    migration_alias_router, migration_router, MigrationState, PolicyAction, PolicyResponse,
    PreloginRequest,
};
pub use flow::{
    DirectoryProvider, LegacyIdentityProvider, MigrationError, MigrationFlow, MigrationOutcome,
};
