//! Request body validation for vulnerability reports.
//!
//! Runs before any store or LLM call. Every required field must be present and
//! hold a string that is non-empty after trimming; unknown keys are ignored.

use serde_json::Value;

use crate::errors::AppError;
use crate::models::vulnerability::VulnerabilityReport;

/// Required report fields, in the order they are reported.
pub const REQUIRED_FIELDS: [&str; 4] = ["vulnerability_id", "description", "code_snippet", "language"];

/// Validate a parsed request body and extract the report.
pub fn validate_report(body: &Value) -> Result<VulnerabilityReport, AppError> {
    let obj = body
        .as_object()
        .ok_or_else(|| AppError::Validation("JSON body must be an object".to_string()))?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !obj.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let field = |name: &str| -> Result<String, AppError> {
        match obj.get(name).and_then(Value::as_str) {
            Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
            _ => Err(AppError::Validation(format!(
                "Field '{name}' must be a non-empty string"
            ))),
        }
    };

    Ok(VulnerabilityReport {
        vulnerability_id: field("vulnerability_id")?,
        description: field("description")?,
        code_snippet: field("code_snippet")?,
        language: field("language")?,
    })
}
