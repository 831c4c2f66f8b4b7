//! Unified error handling mapped onto the analysis endpoint's JSON error bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// Application error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database lookup failed: {0}")]
    LookupFailed(String),

    #[error("LLM call failed: {0}")]
    LlmCall(String),

    #[error("LLM returned invalid JSON")]
    LlmInvalidJson { raw: String },

    #[error("Missing keys in LLM output")]
    LlmMissingKeys { raw: Value },

    #[error("Vulnerability ID '{0}' already exists")]
    Conflict(String),

    #[error("Database insert failed: {0}")]
    InsertFailed(String),
}

impl AppError {
    /// Check if this error was caused by the caller's request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidJson | Self::Validation(_) | Self::Conflict(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidJson | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::LookupFailed(_) | AppError::InsertFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::LlmCall(_)
            | AppError::LlmInvalidJson { .. }
            | AppError::LlmMissingKeys { .. } => StatusCode::BAD_GATEWAY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// JSON body sent to the caller.
    pub fn body(&self) -> Value {
        match self {
            AppError::InvalidJson => json!({ "error": "Invalid JSON" }),
            AppError::Validation(msg) => json!({ "error": msg }),
            AppError::LookupFailed(detail) => {
                json!({ "error": "Database lookup failed", "detail": detail })
            }
            AppError::LlmCall(detail) => json!({ "error": "LLM call failed", "detail": detail }),
            AppError::LlmInvalidJson { raw } => {
                json!({ "error": "LLM returned invalid JSON", "raw": raw })
            }
            AppError::LlmMissingKeys { raw } => {
                json!({ "error": "Missing keys in LLM output", "raw": raw })
            }
            AppError::Conflict(id) => json!({
                "error": format!("Vulnerability ID '{id}' already exists. Use a unique ID.")
            }),
            AppError::InsertFailed(detail) => {
                json!({ "error": "Database insert failed", "detail": detail })
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}
