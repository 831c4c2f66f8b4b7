pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use services::llm::LlmProvider;
use services::store::VulnerabilityStore;

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VulnerabilityStore>,
    pub llm: Arc<dyn LlmProvider>,
    pub config: config::AppConfig,
}
