//! Health Check Endpoints
//!
//! - /health - Combined health status
//! - /health/live - Liveness probe
//! - /health/ready - Readiness probe

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use utoipa::ToSchema;

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
    /// Service is running but a back end is not configured
    Degraded,
}

/// Individual health check result
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Full health response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
}

/// Simple health status response
#[derive(Debug, Serialize, ToSchema)]
pub struct SimpleHealthResponse {
    pub status: HealthStatus,
}

/// Health service state
#[derive(Clone)]
pub struct HealthState {
    pub version: Option<String>,
    pub started_at: DateTime<Utc>,
    /// Set once routers are mounted and the listener is bound
    pub ready: Arc<AtomicBool>,
    /// Back ends and whether their credentials are present
    pub backends: Arc<Vec<(String, bool)>>,
}

impl HealthState {
    pub fn new(version: Option<String>) -> Self {
        Self {
            version,
            started_at: Utc::now(),
            ready: Arc::new(AtomicBool::new(false)),
            backends: Arc::new(Vec::new()),
        }
    }

    pub fn with_backend(mut self, name: impl Into<String>, configured: bool) -> Self {
        Arc::make_mut(&mut self.backends).push((name.into(), configured));
        self
    }

    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn backend_checks(&self) -> Vec<HealthCheck> {
        self.backends
            .iter()
            .map(|(name, configured)| HealthCheck {
                name: name.clone(),
                status: if *configured { HealthStatus::Up } else { HealthStatus::Degraded },
                message: (!configured).then(|| "credentials not configured".to_string()),
            })
            .collect()
    }
}

/// Combined health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy or degraded", body = HealthResponse),
        (status = 503, description = "Service is not ready", body = HealthResponse)
    )
)]
pub async fn get_health(State(state): State<HealthState>) -> Response {
    let checks = state.backend_checks();

    let overall_status = if !state.is_ready() {
        HealthStatus::Down
    } else if checks.iter().any(|c| c.status != HealthStatus::Up) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Up
    };

    let response = HealthResponse {
        status: overall_status,
        timestamp: Utc::now(),
        version: state.version.clone(),
        checks,
    };

    let status_code = if overall_status == HealthStatus::Down {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response)).into_response()
}

/// Liveness probe
///
/// Always 200 while the process is serving requests.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = SimpleHealthResponse)
    )
)]
pub async fn get_liveness() -> Json<SimpleHealthResponse> {
    Json(SimpleHealthResponse {
        status: HealthStatus::Up,
    })
}

/// Readiness probe
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = SimpleHealthResponse),
        (status = 503, description = "Service is not ready", body = SimpleHealthResponse)
    )
)]
pub async fn get_readiness(State(state): State<HealthState>) -> Response {
    let (status, status_code) = if state.is_ready() {
        (HealthStatus::Up, StatusCode::OK)
    } else {
        (HealthStatus::Down, StatusCode::SERVICE_UNAVAILABLE)
    };

    (status_code, Json(SimpleHealthResponse { status })).into_response()
}

/// Create the health router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(get_health))
        .route("/live", get(get_liveness))
        .route("/ready", get(get_readiness))
        .with_state(state)
}
