//! Fixed instruction template sent to the model for every analysis.

use crate::models::vulnerability::VulnerabilityReport;
use crate::services::llm::ChatMessage;

pub const SYSTEM_PROMPT: &str = r#"You are an expert security engineer. Given a vulnerability described in JSON,
produce a valid JSON response containing exactly these keys:
- "vulnerability_id": same ID from input
- "fixed_code": a code snippet that fixes the issue (in the same language)
- "fix_description": a short plain-text sentence describing the change

If the vulnerability cannot be safely fixed or involves disallowed content, respond with:
{"vulnerability_id": "<same id>", "fixed_code": "", "fix_description": "REFUSED: unsafe or disallowed content"}

Do not output any text outside the JSON object."#;

/// Build the system + user message pair for a report.
pub fn build_messages(report: &VulnerabilityReport) -> Vec<ChatMessage> {
    // Serializing a struct of plain strings cannot fail.
    let report_json = serde_json::to_string(report).unwrap_or_default();
    let user_content = format!(
        "Here is the vulnerability JSON:\n{report_json}\nReturn only the required JSON."
    );

    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_content),
    ]
}
