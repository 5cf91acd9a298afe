//! `/api/external-user-data` endpoint

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use pb_common::Secret;
use std::sync::Arc;
use tracing::warn;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::{ExternalProfile, ProfileService};
use crate::shared::api_common::MessageResponse;

pub const PROVIDER_HEADER: &str = "identity-provider";
pub const TOKEN_HEADER: &str = "provider-token";

/// Profile service state
#[derive(Clone)]
pub struct ProfileState {
    pub service: Arc<ProfileService>,
}

type ConflictResponse = (StatusCode, Json<MessageResponse>);

fn conflict(message: &str) -> ConflictResponse {
    (StatusCode::CONFLICT, Json(MessageResponse::new(message)))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Token from `provider-token`, falling back to `Authorization: Bearer`.
/// Tokens are passed through unchanged.
fn provider_token(headers: &HeaderMap) -> Option<Secret> {
    if let Some(token) = header_value(headers, TOKEN_HEADER) {
        return Some(Secret::new(token));
    }

    header_value(headers, header::AUTHORIZATION.as_str())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(Secret::new)
}

/// Fetch email and avatar from an external provider
///
/// The provider is named by the `identity-provider` header (github,
/// linkedin, google) and called with the caller's access token.
#[utoipa::path(
    get,
    path = "",
    tag = "external-user-data",
    operation_id = "getApiExternalUserData",
    params(
        ("identity-provider" = String, Header, description = "github, linkedin or google"),
        ("provider-token" = Option<String>, Header, description = "Provider access token (or Authorization: Bearer)")
    ),
    responses(
        (status = 200, description = "Profile found", body = ExternalProfile),
        (status = 409, description = "Headers missing or profile unavailable", body = MessageResponse)
    )
)]
pub async fn get_external_user_data(
    State(state): State<ProfileState>,
    headers: HeaderMap,
) -> Result<Json<ExternalProfile>, ConflictResponse> {
    let (provider, token) = match (header_value(&headers, PROVIDER_HEADER), provider_token(&headers)) {
        (Some(provider), Some(token)) => (provider, token),
        _ => return Err(conflict("Provider headers missing.")),
    };

    match state.service.fetch_profile(provider, &token).await {
        Ok(profile) => Ok(Json(profile)),
        Err(e) => {
            warn!(provider, error = %e, "External profile lookup failed");
            Err(conflict("Could not retrieve external user data."))
        }
    }
}

/// Create the external user data router
pub fn external_user_data_router(state: ProfileState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_external_user_data))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_header_preferred() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("gho_AbC"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer other"));

        assert_eq!(provider_token(&headers).unwrap().expose(), "gho_AbC");
    }

    #[test]
    fn test_bearer_fallback_keeps_case() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer ya29.MiXeD"));

        assert_eq!(provider_token(&headers).unwrap().expose(), "ya29.MiXeD");
    }

    #[test]
    fn test_missing_or_blank_headers() {
        let mut headers = HeaderMap::new();
        assert!(provider_token(&headers).is_none());

        headers.insert(TOKEN_HEADER, HeaderValue::from_static("   "));
        assert!(provider_token(&headers).is_none());
        assert!(header_value(&headers, PROVIDER_HEADER).is_none());
    }
}
