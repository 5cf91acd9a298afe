//! Migration decision flow.

use std::sync::Arc;

use async_trait::async_trait;
use pb_common::{mask_identifier, Secret};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::directory::{DirectoryError, ProvisionedAccount};
use crate::legacy::{CredentialValidation, LegacyError};

/// Legacy identity provider as seen by the migration flow
#[async_trait]
pub trait LegacyIdentityProvider: Send + Sync {
    async fn user_exists(&self, identifier: &str) -> Result<bool, LegacyError>;

    async fn validate_credentials(
        &self,
        identifier: &str,
        secret: &Secret,
    ) -> Result<CredentialValidation, LegacyError>;
}

/// New directory as seen by the migration flow
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    async fn user_exists(&self, identifier: &str) -> Result<bool, DirectoryError>;

    /// `Ok(None)` means the directory accepted the call but returned no account.
    async fn create_user(
        &self,
        identifier: &str,
        secret: &Secret,
    ) -> Result<Option<ProvisionedAccount>, DirectoryError>;
}

/// Successful migration outcomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Already present in the new directory
    AlreadyMigrated,
    /// Provisioned from the legacy provider during this call
    Provisioned(ProvisionedAccount),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    #[error("User does not exist.")]
    UserNotFound,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("An error occurred while creating the user.")]
    ProvisioningFailed,

    #[error("An unexpected error occurred. Please try again later.")]
    LookupFailed,

    #[error("An unexpected error occurred. Please try again later.")]
    Configuration,
}

impl MigrationError {
    /// HTTP status reported back to the policy engine
    pub fn status_code(&self) -> u16 {
        match self {
            MigrationError::UserNotFound | MigrationError::InvalidCredentials => 400,
            MigrationError::ProvisioningFailed
            | MigrationError::LookupFailed
            | MigrationError::Configuration => 500,
        }
    }

    /// Message safe to show the end user
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// The migration decision sequence.
///
/// Steps run strictly in order: directory lookup, legacy lookup, credential
/// validation, provisioning. Presence in the directory short-circuits.
pub struct MigrationFlow {
    legacy: Arc<dyn LegacyIdentityProvider>,
    directory: Arc<dyn DirectoryProvider>,
}

impl MigrationFlow {
    pub fn new(
        legacy: Arc<dyn LegacyIdentityProvider>,
        directory: Arc<dyn DirectoryProvider>,
    ) -> Self {
        Self { legacy, directory }
    }

    #[tracing::instrument(skip_all, fields(identifier = %mask_identifier(identifier)))]
    pub async fn migrate(
        &self,
        identifier: &str,
        secret: &Secret,
    ) -> Result<MigrationOutcome, MigrationError> {
        let in_directory = self.directory.user_exists(identifier).await.map_err(|e| {
            error!(error = %e, "Directory lookup failed");
            directory_failure(&e, MigrationError::LookupFailed)
        })?;

        if in_directory {
            info!("User already exists in directory, continuing");
            return Ok(MigrationOutcome::AlreadyMigrated);
        }

        let in_legacy = self.legacy.user_exists(identifier).await.map_err(|e| {
            error!(error = %e, "Legacy lookup failed");
            legacy_failure(&e, MigrationError::LookupFailed)
        })?;

        if !in_legacy {
            warn!("User does not exist in directory or legacy provider");
            return Err(MigrationError::UserNotFound);
        }

        let validation = self
            .legacy
            .validate_credentials(identifier, secret)
            .await
            .map_err(|e| {
                error!(error = %e, "Legacy credential validation failed");
                legacy_failure(&e, MigrationError::InvalidCredentials)
            })?;

        if validation.status_code != 200 {
            warn!(
                status = validation.status_code,
                detail = validation.error_detail.as_deref().unwrap_or("unknown error"),
                "Legacy password validation rejected"
            );
            return Err(MigrationError::InvalidCredentials);
        }

        let account = self
            .directory
            .create_user(identifier, secret)
            .await
            .map_err(|e| {
                error!(error = %e, "Directory provisioning failed");
                directory_failure(&e, MigrationError::ProvisioningFailed)
            })?
            .ok_or_else(|| {
                error!("Directory returned no account for created user");
                MigrationError::ProvisioningFailed
            })?;

        info!(account_id = %account.account_id, "User migrated to directory");
        Ok(MigrationOutcome::Provisioned(account))
    }
}

fn legacy_failure(err: &LegacyError, step_error: MigrationError) -> MigrationError {
    match err {
        LegacyError::Configuration(_) => MigrationError::Configuration,
        _ => step_error,
    }
}

fn directory_failure(err: &DirectoryError, step_error: MigrationError) -> MigrationError {
    match err {
        DirectoryError::Configuration(_) => MigrationError::Configuration,
        _ => step_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(MigrationError::UserNotFound.status_code(), 400);
        assert_eq!(MigrationError::InvalidCredentials.status_code(), 400);
        assert_eq!(MigrationError::ProvisioningFailed.status_code(), 500);
        assert_eq!(MigrationError::LookupFailed.status_code(), 500);
        assert_eq!(MigrationError::Configuration.status_code(), 500);
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(MigrationError::UserNotFound.user_message(), "User does not exist.");
        assert_eq!(
            MigrationError::InvalidCredentials.user_message(),
            "Invalid email or password."
        );
        assert_eq!(
            MigrationError::Configuration.user_message(),
            MigrationError::LookupFailed.user_message()
        );
    }

    #[test]
    fn test_configuration_errors_map_to_configuration() {
        let legacy = LegacyError::Configuration("auth0.domain".into());
        assert_eq!(
            legacy_failure(&legacy, MigrationError::InvalidCredentials),
            MigrationError::Configuration
        );

        let directory = DirectoryError::Api {
            status: 503,
            body: String::new(),
        };
        assert_eq!(
            directory_failure(&directory, MigrationError::ProvisioningFailed),
            MigrationError::ProvisioningFailed
        );
    }
}
