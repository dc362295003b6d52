//! Typed errors for the herbal-chain crate.
//!
//! [`ChainError`] never leaves the crate's public operations: the diagnosis
//! chain absorbs it into the fallback result and records its message.
//! [`InputError`] is the only error a caller sees.

use ai_llm_service::AiLlmError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChainError {
    /// Generation call failed (transport, non-2xx, timeout, config).
    #[error("[Herbal Chain] generation failed: {0}")]
    Generation(#[from] AiLlmError),

    /// Reply is not a JSON object of the expected shape.
    #[error("[Herbal Chain] reply is not a valid diagnosis record: {0}")]
    Parse(#[from] serde_json::Error),

    /// Reply parsed but a required field is empty.
    #[error("[Herbal Chain] diagnosis record field `{field}` is empty")]
    EmptyField { field: &'static str },

    /// History persistence or lookup failed.
    #[error("[Herbal Chain] history store failed: {0}")]
    Storage(String),
}

/// Boundary validation failures, reported to the caller as 4xx.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InputError {
    #[error("[Herbal Chain] at least one symptom is required")]
    NoSymptoms,

    #[error("[Herbal Chain] symptom #{index} is blank")]
    BlankSymptom { index: usize },

    #[error("[Herbal Chain] answer keys must not be blank")]
    BlankAnswerKey,

    #[error("[Herbal Chain] userId must not be blank when present")]
    BlankUserId,

    #[error("[Herbal Chain] message must not be blank")]
    BlankMessage,
}

impl InputError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
