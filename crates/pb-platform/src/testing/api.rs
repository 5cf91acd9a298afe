//! `/api/oauth-credentials/{provider}` endpoint

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::credentials_service::CredentialLoginService;

#[derive(Clone)]
pub struct TestingState {
    pub service: Arc<CredentialLoginService>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TestTokenResponse {
    pub provider: String,
    pub access_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TestTokenError {
    pub error: String,
    pub provider: String,
}

/// Get an access token for the shared test account
#[utoipa::path(
    get,
    path = "/{provider}",
    tag = "testing",
    operation_id = "getApiOauthCredentials",
    params(
        ("provider" = String, Path, description = "google, linkedin or auth0")
    ),
    responses(
        (status = 200, description = "Token issued", body = TestTokenResponse),
        (status = 400, description = "Token request failed", body = TestTokenError)
    )
)]
pub async fn get_access_token(
    State(state): State<TestingState>,
    Path(provider): Path<String>,
) -> Response {
    match state.service.get_access_token(&provider).await {
        Ok(token) => Json(TestTokenResponse {
            provider,
            access_token: token.expose().to_string(),
        })
        .into_response(),
        Err(e) => {
            error!(%provider, error = %e, "Test token retrieval failed");
            (
                StatusCode::BAD_REQUEST,
                Json(TestTokenError {
                    error: e.to_string(),
                    provider,
                }),
            )
                .into_response()
        }
    }
}

/// Create the test credentials router
pub fn oauth_credentials_router(state: TestingState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_access_token))
        .with_state(state)
}
