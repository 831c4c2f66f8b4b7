//! Vulnerability analysis endpoint.

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::vulnerability::FixResult;
use crate::services::{analysis, validation};
use crate::AppState;

/// POST /analyze_vulnerability — return a model-generated fix for a reported vulnerability.
///
/// The body is parsed regardless of `Content-Type`.
pub async fn analyze_vulnerability(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FixResult>, AppError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|_| AppError::InvalidJson)?;
    let report = validation::validate_report(&payload)?;

    let fix = analysis::analyze(
        state.store.as_ref(),
        state.llm.as_ref(),
        &state.config,
        report,
    )
    .await?;

    Ok(Json(fix))
}
