//! Platform Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Upstream error from {service}: {message}")]
    Upstream { service: String, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

/// Error response body
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            PlatformError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            PlatformError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            PlatformError::Upstream { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            PlatformError::Configuration { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            PlatformError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        // Configuration detail names missing settings; keep it in the logs.
        let message = match &self {
            PlatformError::Configuration { message } => {
                tracing::error!(detail = %message, "Request failed on missing configuration");
                "Service is not configured for this operation".to_string()
            }
            // Vendor error bodies go to the logs only.
            PlatformError::Upstream { service, message } => {
                tracing::warn!(%service, detail = %message, "Upstream request failed");
                format!("Request to {} failed", service)
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (PlatformError::not_found("Auth0User", "a@x.com"), StatusCode::NOT_FOUND),
            (PlatformError::validation("bad"), StatusCode::BAD_REQUEST),
            (PlatformError::upstream("graph", "503"), StatusCode::BAD_GATEWAY),
            (PlatformError::configuration("auth0.domain"), StatusCode::INTERNAL_SERVER_ERROR),
            (PlatformError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_not_found_message() {
        let err = PlatformError::not_found("GraphUser", "a@x.com");
        assert_eq!(err.to_string(), "Entity not found: GraphUser with id a@x.com");
    }

    #[tokio::test]
    async fn test_upstream_body_not_returned() {
        use http_body_util::BodyExt;

        let response = PlatformError::upstream("graph", "Graph returned 400: {\"password\":\"Pw1!\"}")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "UPSTREAM_ERROR");
        assert_eq!(body["message"], "Request to graph failed");
    }
}
