//! API module for the feedback service
//!
//! This module contains the HTTP endpoints and server setup: the feedback
//! submission handler, health checks, and request handling middleware.

pub mod feedback;
pub mod health;
pub mod server;

pub use feedback::submit_feedback;
pub use health::{health_check, ready_check};
pub use server::{create_router, create_server, shutdown_signal, AppState};

/// Message returned with every accepted submission
pub const ACCEPTED_MESSAGE: &str = "Feedback accepted";

/// Body of a `201 Created` response
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeedbackAccepted {
    /// Fixed confirmation message
    pub message: String,
    /// Identifier assigned by the store
    pub id: String,
}

impl FeedbackAccepted {
    /// Build the response for a stored record
    pub fn new(id: uuid::Uuid) -> Self {
        Self {
            message: ACCEPTED_MESSAGE.to_string(),
            id: id.to_string(),
        }
    }
}

/// Liveness response
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests
    pub status: String,
}

/// Ready check response
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ReadyResponse {
    /// Overall readiness status
    pub status: HealthStatus,
    /// Individual component checks
    pub checks: std::collections::HashMap<String, ComponentHealth>,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Component health status
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ComponentHealth {
    /// Component status
    pub status: HealthStatus,
    /// Optional error message
    pub message: Option<String>,
    /// Last check timestamp
    pub last_check: chrono::DateTime<chrono::Utc>,
}

/// Health status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Component is reachable
    Healthy,
    /// Component failed its check
    Unhealthy,
}

impl HealthStatus {
    /// Check if the status is healthy
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    /// Convert to HTTP status code
    pub fn to_status_code(&self) -> axum::http::StatusCode {
        match self {
            HealthStatus::Healthy => axum::http::StatusCode::OK,
            HealthStatus::Unhealthy => axum::http::StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
