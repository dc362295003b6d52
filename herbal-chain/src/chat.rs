//! Conversational replies: no retrieval, one generation call, verbatim text.

use std::time::Instant;

use ai_llm_service::{LlmUsage, TextGenerator};
use serde::Serialize;
use tracing::{info, warn};

use crate::{prompt::build_chat_prompt, schema::DiagnosisRecord};

/// Returned whenever the generation call fails.
pub const CHAT_APOLOGY: &str =
    "We're sorry, the system is busy right now. Please try again in a little while.";

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMetadata {
    pub processing_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_usage: Option<LlmUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatOutput {
    pub response: String,
    pub metadata: ChatMetadata,
}

pub struct ChatChain<G> {
    generator: G,
}

impl<G: TextGenerator> ChatChain<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Answers `message`, mentioning the previous diagnosis when given.
    /// Never fails: errors turn into [`CHAT_APOLOGY`].
    pub async fn invoke(&self, message: &str, diagnosis: Option<&DiagnosisRecord>) -> ChatOutput {
        let started = Instant::now();
        let current = diagnosis.map(|d| (d.category.as_str(), d.recommended_herbs.as_slice()));
        let prompt = build_chat_prompt(message, current);

        let mut metadata = ChatMetadata::default();
        let response = match self.generator.generate(&prompt.into_messages()).await {
            Ok(reply) => {
                metadata.llm_usage = reply.usage;
                reply.content
            }
            Err(e) => {
                warn!(status = %e.status(), error = %e, "chat generation failed");
                metadata.error = Some(e.to_string());
                CHAT_APOLOGY.to_string()
            }
        };
        metadata.processing_time_ms = started.elapsed().as_millis() as u64;

        info!(
            with_diagnosis = diagnosis.is_some(),
            failed = metadata.error.is_some(),
            elapsed_ms = metadata.processing_time_ms,
            "chat reply"
        );
        ChatOutput { response, metadata }
    }
}
