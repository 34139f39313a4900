//! Health check endpoints
//!
//! `/health` is a plain liveness probe. `/readyz` also pings the storage
//! collaborator.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::collections::HashMap;

use crate::api::{AppState, ComponentHealth, HealthResponse, HealthStatus, ReadyResponse};

/// Basic liveness check endpoint
///
/// Always returns `200 {"status": "ok"}` and never touches storage.
pub async fn health_check() -> Response {
    let response = HealthResponse {
        status: "ok".to_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Readiness check endpoint
///
/// Returns 200 when the storage collaborator answers its health check,
/// 503 otherwise.
pub async fn ready_check(State(state): State<AppState>) -> Response {
    let storage = match state.repository.health_check().await {
        Ok(()) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: None,
            last_check: Utc::now(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Storage readiness check failed");
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                message: Some("Storage is unreachable".to_string()),
                last_check: Utc::now(),
            }
        },
    };

    let overall_status = storage.status;
    let mut checks = HashMap::new();
    checks.insert("storage".to_string(), storage);

    let response = ReadyResponse {
        status: overall_status,
        checks,
        timestamp: Utc::now(),
    };

    (overall_status.to_status_code(), Json(response)).into_response()
}
