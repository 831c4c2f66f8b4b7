//! Validation and normalization of the model's JSON reply.

use serde_json::Value;

use crate::errors::AppError;
use crate::models::vulnerability::FixResult;

pub const EXPECTED_KEYS: [&str; 3] = ["vulnerability_id", "fixed_code", "fix_description"];

/// Parse the raw reply into a [`FixResult`] carrying the caller's id.
///
/// The model's own `vulnerability_id` must be present but is always replaced.
pub fn parse_fix_output(raw: &str, vulnerability_id: &str) -> Result<FixResult, AppError> {
    let parsed: Value = serde_json::from_str(raw).map_err(|_| AppError::LlmInvalidJson {
        raw: raw.to_string(),
    })?;

    let Some(obj) = parsed.as_object() else {
        return Err(AppError::LlmMissingKeys { raw: parsed });
    };
    if !EXPECTED_KEYS.iter().all(|key| obj.contains_key(*key)) {
        return Err(AppError::LlmMissingKeys { raw: parsed });
    }

    let (Some(fixed_code), Some(fix_description)) = (
        obj.get("fixed_code").and_then(Value::as_str),
        obj.get("fix_description").and_then(Value::as_str),
    ) else {
        return Err(AppError::LlmMissingKeys { raw: parsed });
    };

    Ok(FixResult {
        vulnerability_id: vulnerability_id.to_string(),
        fixed_code: fixed_code.to_string(),
        fix_description: fix_description.to_string(),
    })
}
