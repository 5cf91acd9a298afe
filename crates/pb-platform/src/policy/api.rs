//! Error fixture endpoints under `/api/error-messages`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::{PolicyErrorKind, PolicyErrorResponse};

/// Unversioned `{ message }` error body
#[derive(Debug, Serialize, ToSchema)]
pub struct PolicyErrorPlain {
    pub message: String,
}

fn versioned(kind: PolicyErrorKind) -> Response {
    let status = StatusCode::from_u16(kind.status()).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(PolicyErrorResponse::from(kind))).into_response()
}

fn plain(kind: PolicyErrorKind) -> Response {
    let status = StatusCode::from_u16(kind.status()).unwrap_or(StatusCode::BAD_REQUEST);
    let body = PolicyErrorPlain {
        message: kind.user_message().to_string(),
    };
    (status, Json(body)).into_response()
}

/// User already exists (versioned)
#[utoipa::path(
    get,
    path = "/user-already-exists",
    tag = "error-messages",
    responses((status = 400, description = "Fixture", body = PolicyErrorResponse))
)]
pub async fn user_already_exists() -> Response {
    versioned(PolicyErrorKind::UserAlreadyExists)
}

/// User already exists (plain)
#[utoipa::path(
    get,
    path = "/user-already-exists-2",
    tag = "error-messages",
    responses((status = 400, description = "Fixture", body = PolicyErrorPlain))
)]
pub async fn user_already_exists_plain() -> Response {
    plain(PolicyErrorKind::UserAlreadyExists)
}

/// Invalid password (versioned)
#[utoipa::path(
    get,
    path = "/invalid-password",
    tag = "error-messages",
    responses((status = 400, description = "Fixture", body = PolicyErrorResponse))
)]
pub async fn invalid_password() -> Response {
    versioned(PolicyErrorKind::InvalidPassword)
}

/// Invalid password (plain)
#[utoipa::path(
    get,
    path = "/invalid-password-2",
    tag = "error-messages",
    responses((status = 400, description = "Fixture", body = PolicyErrorPlain))
)]
pub async fn invalid_password_plain() -> Response {
    plain(PolicyErrorKind::InvalidPassword)
}

/// Server error (versioned)
#[utoipa::path(
    get,
    path = "/server-error",
    tag = "error-messages",
    responses((status = 500, description = "Fixture", body = PolicyErrorResponse))
)]
pub async fn server_error() -> Response {
    versioned(PolicyErrorKind::ServerError)
}

/// Create the error fixtures router
pub fn error_messages_router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(user_already_exists))
        .routes(routes!(user_already_exists_plain))
        .routes(routes!(invalid_password))
        .routes(routes!(invalid_password_plain))
        .routes(routes!(server_error))
}
