//! Auth0 user endpoints under `/api/auth0-users`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::client::Auth0Client;
use super::entity::CredentialValidation;
use crate::shared::api_common::{CredentialsRequest, UserSummary};
use crate::shared::error::PlatformError;

/// Auth0 users service state
#[derive(Clone)]
pub struct Auth0UsersState {
    pub client: Arc<Auth0Client>,
}

/// Get Auth0 user by email
#[utoipa::path(
    get,
    path = "/{email}",
    tag = "auth0-users",
    operation_id = "getApiAuth0UsersByEmail",
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, description = "User found", body = UserSummary),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<Auth0UsersState>,
    Path(email): Path<String>,
) -> Result<Json<UserSummary>, PlatformError> {
    let user = state
        .client
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| PlatformError::not_found("Auth0User", &email))?;

    Ok(Json(user))
}

/// Create Auth0 user
#[utoipa::path(
    post,
    path = "",
    tag = "auth0-users",
    operation_id = "postApiAuth0Users",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User created", body = UserSummary),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Auth0 rejected the request")
    )
)]
pub async fn create_user(
    State(state): State<Auth0UsersState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserSummary>), PlatformError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(PlatformError::validation("email and password are required"));
    }

    let user = state.client.create_user(req.email.trim(), &req.password).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Delete Auth0 user by email
#[utoipa::path(
    delete,
    path = "/{email}",
    tag = "auth0-users",
    operation_id = "deleteApiAuth0UsersByEmail",
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<Auth0UsersState>,
    Path(email): Path<String>,
) -> Result<StatusCode, PlatformError> {
    if state.client.delete_user_by_email(&email).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(PlatformError::not_found("Auth0User", &email))
    }
}

/// Validate Auth0 credentials
///
/// Returns the validation result with 200 when the password is accepted and
/// 400 otherwise.
#[utoipa::path(
    post,
    path = "/validate",
    tag = "auth0-users",
    operation_id = "postApiAuth0UsersValidate",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = CredentialValidation),
        (status = 400, description = "Credentials rejected", body = CredentialValidation)
    )
)]
pub async fn validate_credentials(
    State(state): State<Auth0UsersState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Response, PlatformError> {
    let result = state
        .client
        .validate_credentials(&req.email, &req.password)
        .await?;

    let status = if result.valid {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    Ok((status, Json(result)).into_response())
}

/// Create the Auth0 users router
pub fn auth0_users_router(state: Auth0UsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_user))
        .routes(routes!(validate_credentials))
        .routes(routes!(get_user, delete_user))
        .with_state(state)
}
