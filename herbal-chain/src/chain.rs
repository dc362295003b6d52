//! Diagnosis generation chain.
//!
//! One invocation:
//! 1. (augmented only) score the answers, retrieve knowledge, build context;
//! 2. build the `{system, user}` prompts;
//! 3. call the generation service once;
//! 4. parse the reply into a [`DiagnosisRecord`].
//!
//! Any failure in 1-4 yields the deterministic fallback record with
//! `ragUsed = false`, no sources and the cause in `error`. [`DiagnosisChain::invoke`]
//! therefore never fails.

use std::sync::Arc;
use std::time::Instant;

use ai_llm_service::{LlmUsage, TextGenerator};
use diagnostic_engine::{AnswerSet, MacroScores, Recommendation};
use herb_knowledge::{Document, KnowledgeStore};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    context::retrieve_context,
    error::Result,
    fallback::fallback_record,
    prompt::{build_augmented_prompt, build_direct_prompt},
    schema::{DiagnosisRecord, parse_diagnosis},
};

/// How prompts are built, fixed at construction.
#[derive(Debug, Clone)]
pub enum ChainStrategy {
    /// Retrieve `top_k` documents from `store` and embed them in the prompt.
    Augmented {
        store: Arc<KnowledgeStore>,
        top_k: usize,
    },
    /// Minimal prompts, no retrieval.
    Direct,
}

impl ChainStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ChainStrategy::Augmented { .. } => "augmented",
            ChainStrategy::Direct => "direct",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChainInput {
    pub symptoms: Vec<String>,
    pub answers: AnswerSet,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainMetadata {
    pub sources: Vec<Document>,
    pub processing_time_ms: u64,
    pub rag_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_usage: Option<LlmUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macro_scores: Option<MacroScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainOutput {
    pub result: DiagnosisRecord,
    pub metadata: ChainMetadata,
}

impl ChainOutput {
    pub fn is_fallback(&self) -> bool {
        self.metadata.error.is_some()
    }
}

pub struct DiagnosisChain<G> {
    generator: G,
    strategy: ChainStrategy,
}

impl<G: TextGenerator> DiagnosisChain<G> {
    pub fn new(generator: G, strategy: ChainStrategy) -> Self {
        Self {
            generator,
            strategy,
        }
    }

    pub fn strategy(&self) -> &ChainStrategy {
        &self.strategy
    }

    /// Runs the chain once. Never fails; see the module docs.
    pub async fn invoke(&self, input: &ChainInput) -> ChainOutput {
        let started = Instant::now();

        let (result, mut metadata) = match self.run(input).await {
            Ok(ok) => ok,
            Err(e) => {
                warn!(
                    strategy = self.strategy.name(),
                    symptoms = input.symptoms.len(),
                    error = %e,
                    "diagnosis chain failed, using fallback"
                );
                let metadata = ChainMetadata {
                    error: Some(e.to_string()),
                    ..Default::default()
                };
                (fallback_record(&input.symptoms), metadata)
            }
        };
        metadata.processing_time_ms = started.elapsed().as_millis() as u64;

        info!(
            strategy = self.strategy.name(),
            rag_used = metadata.rag_used,
            sources = metadata.sources.len(),
            fallback = metadata.error.is_some(),
            elapsed_ms = metadata.processing_time_ms,
            "diagnosis chain finished"
        );
        ChainOutput { result, metadata }
    }

    async fn run(&self, input: &ChainInput) -> Result<(DiagnosisRecord, ChainMetadata)> {
        let mut metadata = ChainMetadata::default();

        let prompt = match &self.strategy {
            ChainStrategy::Augmented { store, top_k } => {
                let documents = store.initialize().await;
                let retrieved = retrieve_context(documents, &input.answers, *top_k);
                metadata.rag_used = true;
                metadata.sources = retrieved.sources;
                metadata.recommendation = Some(retrieved.diagnosis.recommendation);
                metadata.macro_scores = Some(retrieved.diagnosis.macro_scores);
                build_augmented_prompt(&retrieved.context, &input.symptoms, &input.answers)
            }
            ChainStrategy::Direct => build_direct_prompt(&input.symptoms),
        };

        let reply = self.generator.generate(&prompt.into_messages()).await?;
        metadata.llm_usage = reply.usage;
        metadata.model = Some(reply.model);
        metadata.finish_reason = Some(reply.finish_reason);

        let record = parse_diagnosis(&reply.content)?;
        Ok((record, metadata))
    }
}
