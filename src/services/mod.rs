//! Business logic services.

pub mod analysis;
pub mod fix_output;
pub mod llm;
pub mod openai;
pub mod prompt;
pub mod retry;
pub mod store;
pub mod validation;
