//! Vulnerability analysis flow: lookup, model call, normalization, persistence.

use crate::config::{AppConfig, DuplicatePolicy};
use crate::errors::AppError;
use crate::models::vulnerability::{FixResult, NewVulnerabilityRecord, VulnerabilityReport};
use crate::services::fix_output::parse_fix_output;
use crate::services::llm::{CompletionRequest, LlmProvider};
use crate::services::prompt::build_messages;
use crate::services::store::{StoreError, VulnerabilityStore};

/// Produce (or fetch) the fix for a validated report.
///
/// Steps run strictly in sequence. Under [`DuplicatePolicy::ReturnExisting`]
/// a stored fix short-circuits the model call, and losing an insert race to a
/// concurrent request returns the winner's record. Under
/// [`DuplicatePolicy::Reject`] a duplicate id surfaces as [`AppError::Conflict`].
pub async fn analyze(
    store: &dyn VulnerabilityStore,
    llm: &dyn LlmProvider,
    config: &AppConfig,
    report: VulnerabilityReport,
) -> Result<FixResult, AppError> {
    let vulnerability_id = report.vulnerability_id.trim().to_string();

    if config.duplicate_policy == DuplicatePolicy::ReturnExisting {
        if let Some(existing) = lookup(store, &vulnerability_id).await? {
            tracing::info!(vulnerability_id = %vulnerability_id, "Found existing record");
            return Ok(existing);
        }
    }

    let request = CompletionRequest {
        model: config.llm.model.clone(),
        messages: build_messages(&report),
        temperature: 0.0,
        max_tokens: config.llm.max_tokens,
        json_mode: true,
    };

    tracing::debug!(vulnerability_id = %vulnerability_id, model = %request.model, "Requesting fix from LLM");
    let raw = llm.complete(&request).await.map_err(|e| {
        tracing::warn!(vulnerability_id = %vulnerability_id, error = %e, "LLM call failed");
        AppError::LlmCall(e.to_string())
    })?;

    let fix = parse_fix_output(&raw, &vulnerability_id)?;
    if fix.is_refusal() {
        tracing::info!(vulnerability_id = %vulnerability_id, "Model refused to produce a fix");
    }

    let record = NewVulnerabilityRecord::new(&report, &fix);
    match store.insert(&record).await {
        Ok(()) => {
            tracing::info!(vulnerability_id = %vulnerability_id, "Stored vulnerability fix");
            Ok(fix)
        }
        Err(StoreError::Duplicate(id)) => match config.duplicate_policy {
            DuplicatePolicy::Reject => Err(AppError::Conflict(id)),
            DuplicatePolicy::ReturnExisting => {
                tracing::info!(vulnerability_id = %id, "Lost insert race, returning stored record");
                let stored = lookup(store, &id).await?;
                stored.ok_or(AppError::Conflict(id))
            }
        },
        Err(e) => Err(AppError::InsertFailed(e.to_string())),
    }
}

async fn lookup(
    store: &dyn VulnerabilityStore,
    vulnerability_id: &str,
) -> Result<Option<FixResult>, AppError> {
    store
        .find_fix(vulnerability_id)
        .await
        .map_err(|e| AppError::LookupFailed(e.to_string()))
}
