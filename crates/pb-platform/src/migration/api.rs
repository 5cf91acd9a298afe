//! Pre-login validation endpoint called by the B2C custom policy.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use pb_common::Secret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::flow::{MigrationError, MigrationFlow};

/// API connector contract version
pub const POLICY_RESPONSE_VERSION: &str = "1.0.0";

/// Pre-login request.
///
/// Policies in the wild send the identifier as `identifier`, `email` or
/// `signInName`, and the secret as `secret` or `password`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreloginRequest {
    #[serde(alias = "email", alias = "signInName")]
    pub identifier: String,
    #[serde(alias = "password")]
    #[schema(value_type = String)]
    pub secret: Secret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PolicyAction {
    Continue,
    ValidationError,
}

/// Response shape expected by the policy engine's API connector
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResponse {
    pub version: String,
    pub status: u16,
    pub action: PolicyAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
}

impl PolicyResponse {
    pub fn continue_flow() -> Self {
        Self {
            version: POLICY_RESPONSE_VERSION.to_string(),
            status: 200,
            action: PolicyAction::Continue,
            user_message: None,
        }
    }

    pub fn validation_error(status: u16, user_message: impl Into<String>) -> Self {
        Self {
            version: POLICY_RESPONSE_VERSION.to_string(),
            status,
            action: PolicyAction::ValidationError,
            user_message: Some(user_message.into()),
        }
    }
}

impl From<MigrationError> for PolicyResponse {
    fn from(err: MigrationError) -> Self {
        Self::validation_error(err.status_code(), err.user_message())
    }
}

impl IntoResponse for PolicyResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Migration service state
#[derive(Clone)]
pub struct MigrationState {
    pub flow: Arc<MigrationFlow>,
}

/// Validate a sign-in and migrate the user if needed
#[utoipa::path(
    post,
    path = "/api/prelogin-validation",
    tag = "migration",
    operation_id = "postApiPreloginValidation",
    request_body = PreloginRequest,
    responses(
        (status = 200, description = "Continue the policy flow", body = PolicyResponse),
        (status = 400, description = "User missing, credentials invalid, or malformed request", body = PolicyResponse),
        (status = 500, description = "Lookup, provisioning, or configuration failure", body = PolicyResponse)
    )
)]
pub async fn prelogin_validation(
    State(state): State<MigrationState>,
    body: Result<Json<PreloginRequest>, JsonRejection>,
) -> PolicyResponse {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected malformed pre-login request");
            return PolicyResponse::validation_error(400, "Invalid request.");
        }
    };

    if req.identifier.trim().is_empty() || req.secret.is_empty() {
        return PolicyResponse::validation_error(400, "Email and password are required.");
    }

    match state.flow.migrate(req.identifier.trim(), &req.secret).await {
        Ok(_) => PolicyResponse::continue_flow(),
        Err(err) => err.into(),
    }
}

/// Router for `/api/prelogin-validation`
pub fn migration_router(state: MigrationState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(prelogin_validation))
        .with_state(state)
}

/// `/validate-prelogin`, the path older policies call
pub fn migration_alias_router(state: MigrationState) -> Router {
    Router::new()
        .route("/validate-prelogin", post(prelogin_validation))
        .with_state(state)
}
