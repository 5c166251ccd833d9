//! Welcome and health check endpoints.

use axum::{Json, extract::State, response::IntoResponse};
use http::StatusCode;
use serde::Serialize;
use serde_json::json;

use crate::AppState;

/// Detailed health status response.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Service version
    pub version: String,
    pub database: ComponentStatus,
}

/// Status of a single component.
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    /// Store backend name ("memory" or "sqlite")
    pub backend: String,
    pub healthy: bool,
    /// Optional message with details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Latency of the health check in milliseconds
    pub latency_ms: u64,
}

pub async fn welcome() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the Loadboard API" }))
}

/// Health check reporting whether the store answers queries.
///
/// Returns 503 when the store is unreachable.
#[tracing::instrument(name = "health.check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = std::time::Instant::now();
    let result = state.db.health_check().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let healthy = result.is_ok();
    if let Err(e) = &result {
        tracing::warn!(error = %e, "Store health check failed");
    }

    let health = HealthStatus {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: ComponentStatus {
            backend: state.db.backend().to_string(),
            healthy,
            message: (!healthy).then(|| "Database connection failed".to_string()),
            latency_ms,
        },
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health))
}
