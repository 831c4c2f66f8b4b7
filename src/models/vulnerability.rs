//! Vulnerability report, generated fix, and the persisted record combining both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// `fix_description` the model returns when it declines to produce a fix.
pub const REFUSAL_DESCRIPTION: &str = "REFUSED: unsafe or disallowed content";

/// Caller-submitted vulnerability description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VulnerabilityReport {
    pub vulnerability_id: String,
    pub description: String,
    pub code_snippet: String,
    pub language: String,
}

/// Normalized fix returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct FixResult {
    pub vulnerability_id: String,
    pub fixed_code: String,
    pub fix_description: String,
}

impl FixResult {
    /// Whether the model declined to produce a fix.
    pub fn is_refusal(&self) -> bool {
        self.fix_description.trim() == REFUSAL_DESCRIPTION
    }
}

/// Row written to the `vulnerabilities` table.
#[derive(Debug, Clone)]
pub struct NewVulnerabilityRecord {
    pub vulnerability_id: String,
    pub description: String,
    pub code_snippet: String,
    pub language: String,
    pub fixed_code: String,
    pub fix_description: String,
}

impl NewVulnerabilityRecord {
    pub fn new(report: &VulnerabilityReport, fix: &FixResult) -> Self {
        Self {
            vulnerability_id: fix.vulnerability_id.clone(),
            description: report.description.clone(),
            code_snippet: report.code_snippet.clone(),
            language: report.language.clone(),
            fixed_code: fix.fixed_code.clone(),
            fix_description: fix.fix_description.clone(),
        }
    }

    pub fn fix(&self) -> FixResult {
        FixResult {
            vulnerability_id: self.vulnerability_id.clone(),
            fixed_code: self.fixed_code.clone(),
            fix_description: self.fix_description.clone(),
        }
    }
}

/// Stored record as read back from the database.
#[derive(Debug, Clone, FromRow)]
pub struct VulnerabilityRecord {
    pub vulnerability_id: String,
    pub description: String,
    pub code_snippet: String,
    pub language: String,
    pub fixed_code: String,
    pub fix_description: String,
    pub created_at: DateTime<Utc>,
}
