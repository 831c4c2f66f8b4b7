//! Route definitions for the Aegis API.

pub mod analyze;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Build the full router with tracing, CORS and body-limit layers.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route(
            "/analyze_vulnerability",
            post(analyze::analyze_vulnerability),
        )
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// `*` permits every origin; otherwise only the listed origins are allowed.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Invalid CORS origin in config; skipping");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
