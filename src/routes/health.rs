//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub llm_model: String,
}

/// Liveness probe — always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe — checks database connectivity.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let (code, status, database) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ok", "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", format!("error: {e}"))
        }
    };

    (
        code,
        Json(HealthStatus {
            status: status.to_string(),
            database,
            llm_model: state.config.llm.model.clone(),
        }),
    )
}
