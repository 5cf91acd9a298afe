//! Directory user endpoints under `/api/graph-users`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::client::GraphClient;
use super::entity::{MfaStatus, ProvisionedAccount};
use crate::shared::api_common::{CredentialsRequest, UserSummary};
use crate::shared::error::PlatformError;

/// Graph users service state
#[derive(Clone)]
pub struct GraphUsersState {
    pub client: Arc<GraphClient>,
}

/// Result of an MFA toggle
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MfaChangeResponse {
    pub message: String,
    pub mfa_enabled: bool,
}

/// Get directory user by email
#[utoipa::path(
    get,
    path = "/{email}",
    tag = "graph-users",
    operation_id = "getApiGraphUsersByEmail",
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, description = "User found", body = UserSummary),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<GraphUsersState>,
    Path(email): Path<String>,
) -> Result<Json<UserSummary>, PlatformError> {
    let user = state
        .client
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| PlatformError::not_found("GraphUser", &email))?;

    Ok(Json(user))
}

/// Create directory user
#[utoipa::path(
    post,
    path = "",
    tag = "graph-users",
    operation_id = "postApiGraphUsers",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User created", body = ProvisionedAccount),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Graph rejected the request")
    )
)]
pub async fn create_user(
    State(state): State<GraphUsersState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<ProvisionedAccount>), PlatformError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(PlatformError::validation("email and password are required"));
    }

    let account = state
        .client
        .create_user(req.email.trim(), &req.password)
        .await?
        .ok_or_else(|| PlatformError::internal("Graph returned no account for the created user"))?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Delete directory user by email
#[utoipa::path(
    delete,
    path = "/{email}",
    tag = "graph-users",
    operation_id = "deleteApiGraphUsersByEmail",
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<GraphUsersState>,
    Path(email): Path<String>,
) -> Result<StatusCode, PlatformError> {
    if state.client.delete_user_by_email(&email).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(PlatformError::not_found("GraphUser", &email))
    }
}

/// Enable MFA for a user
#[utoipa::path(
    post,
    path = "/{email}/enable-mfa",
    tag = "graph-users",
    operation_id = "postApiGraphUsersEnableMfa",
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, description = "MFA enabled", body = MfaChangeResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn enable_mfa(
    State(state): State<GraphUsersState>,
    Path(email): Path<String>,
) -> Result<Json<MfaChangeResponse>, PlatformError> {
    let status = state.client.enable_mfa(&email).await?;

    Ok(Json(MfaChangeResponse {
        message: format!("MFA enabled for user '{}'.", email),
        mfa_enabled: status.mfa_enabled,
    }))
}

/// Disable MFA for a user
#[utoipa::path(
    post,
    path = "/{email}/disable-mfa",
    tag = "graph-users",
    operation_id = "postApiGraphUsersDisableMfa",
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, description = "MFA disabled", body = MfaChangeResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn disable_mfa(
    State(state): State<GraphUsersState>,
    Path(email): Path<String>,
) -> Result<Json<MfaChangeResponse>, PlatformError> {
    let status = state.client.disable_mfa(&email).await?;

    Ok(Json(MfaChangeResponse {
        message: format!("MFA disabled for user '{}'.", email),
        mfa_enabled: status.mfa_enabled,
    }))
}

/// Get MFA status for a user
#[utoipa::path(
    get,
    path = "/{email}/mfa-status",
    tag = "graph-users",
    operation_id = "getApiGraphUsersMfaStatus",
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, description = "Current MFA flag", body = MfaStatus),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_mfa_status(
    State(state): State<GraphUsersState>,
    Path(email): Path<String>,
) -> Result<Json<MfaStatus>, PlatformError> {
    Ok(Json(state.client.get_mfa_status(&email).await?))
}

/// Create the Graph users router
pub fn graph_users_router(state: GraphUsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_user))
        .routes(routes!(get_user, delete_user))
        .routes(routes!(enable_mfa))
        .routes(routes!(disable_mfa))
        .routes(routes!(get_mfa_status))
        .with_state(state)
}
