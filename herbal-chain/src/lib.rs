//! Diagnosis pipeline: scoring, retrieval, prompting, generation, fallback.
//!
//! Public entry point: [`DiagnosisService`]. It validates a
//! [`DiagnosisRequest`], scores the answers, retrieves knowledge for the
//! recommended recipe, asks the generation service for a structured
//! [`DiagnosisRecord`] and falls back to a deterministic record when the
//! service fails or its reply does not match the schema.
//!
//! # Example
//! ```no_run
//! # use herbal_chain::{ChainConfig, DiagnosisRequest, DiagnosisService};
//! # use ai_llm_service::{LlmService, config::default_config::config_from_env};
//! # #[tokio::main] async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = LlmService::new(config_from_env()?, Some(10))?;
//! let svc = DiagnosisService::new(ChainConfig::from_env(), llm);
//! let req = DiagnosisRequest {
//!     symptoms: vec!["cold hands".into(), "fatigue".into()],
//!     answers: [("F4".to_string(), true)].into_iter().collect(),
//!     user_id: None,
//! };
//! let out = svc.diagnose(req).await?;
//! println!("{}", out.diagnosis.category);
//! # Ok(()) }
//! ```

mod cfg;
pub mod chain;
pub mod chat;
pub mod context;
mod error;
pub mod fallback;
pub mod history;
pub mod prompt;
pub mod schema;
mod service;

pub use cfg::ChainConfig;
pub use chain::{ChainInput, ChainMetadata, ChainOutput, ChainStrategy, DiagnosisChain};
pub use chat::{CHAT_APOLOGY, ChatChain, ChatMetadata, ChatOutput};
pub use error::{ChainError, InputError};
pub use history::{HistoryEntry, HistoryStore, HistorySummary, InMemoryHistoryStore};
pub use schema::{DiagnosisRecord, Recipe, parse_diagnosis};
pub use service::{
    ChatRequest, ChatResponse, DiagnosisRequest, DiagnosisResponse, DiagnosisService,
    ResponseMetadata, ServiceStatus,
};
