//! Service handle: one per process, shared by reference.
//!
//! Owns the knowledge store, both chains and the history collaborator.
//! Boundary validation happens here; everything past it is infallible from
//! the caller's point of view.

use std::sync::Arc;

use ai_llm_service::TextGenerator;
use chrono::{DateTime, Utc};
use diagnostic_engine::{AnswerSet, MacroScores, Recommendation};
use herb_knowledge::KnowledgeStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    cfg::ChainConfig,
    chain::{ChainInput, ChainMetadata, ChainStrategy, DiagnosisChain},
    chat::{ChatChain, ChatMetadata},
    error::InputError,
    history::{
        HistoryEntry, HistoryMetadata, HistoryStore, HistorySummary, InMemoryHistoryStore,
        RECORD_VERSION,
    },
    schema::{DiagnosisRecord, Recipe},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    pub symptoms: Vec<String>,
    #[serde(default, alias = "userAnswers")]
    pub answers: AnswerSet,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl DiagnosisRequest {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.symptoms.is_empty() {
            return Err(InputError::NoSymptoms);
        }
        if let Some(index) = self.symptoms.iter().position(|s| s.trim().is_empty()) {
            return Err(InputError::BlankSymptom { index });
        }
        if self.answers.keys().any(|k| k.trim().is_empty()) {
            return Err(InputError::BlankAnswerKey);
        }
        if self.user_id.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(InputError::BlankUserId);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub processing_time_ms: u64,
    pub rag_used: bool,
    pub sources_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_tokens: Option<u32>,
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

impl From<&ChainMetadata> for ResponseMetadata {
    fn from(m: &ChainMetadata) -> Self {
        Self {
            processing_time_ms: m.processing_time_ms,
            rag_used: m.rag_used,
            sources_count: m.sources.len(),
            llm_tokens: m.llm_usage.map(|u| u.total_tokens),
            model: m.model.clone(),
            finish_reason: m.finish_reason.clone(),
            recommendation: m.recommendation.clone(),
            macro_scores: m.macro_scores,
            error: m.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisResponse {
    pub diagnosis: DiagnosisRecord,
    pub recipes: Vec<Recipe>,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub diagnosis: Option<DiagnosisRecord>,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.message.trim().is_empty() {
            return Err(InputError::BlankMessage);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub metadata: ChatMetadata,
}

/// Readiness snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    /// `active` once the corpus is loaded, `initializing` before.
    pub rag: &'static str,
    pub documents: usize,
    pub strategy: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub struct DiagnosisService<G, H = InMemoryHistoryStore> {
    cfg: ChainConfig,
    store: Arc<KnowledgeStore>,
    diagnosis: DiagnosisChain<Arc<G>>,
    chat: ChatChain<Arc<G>>,
    history: Arc<H>,
}

impl<G: TextGenerator> DiagnosisService<G> {
    /// Service with an in-memory history store.
    pub fn new(cfg: ChainConfig, generator: G) -> Self {
        Self::with_history(cfg, generator, InMemoryHistoryStore::default())
    }
}

impl<G: TextGenerator, H: HistoryStore> DiagnosisService<G, H> {
    pub fn with_history(cfg: ChainConfig, generator: G, history: H) -> Self {
        let store = Arc::new(cfg.make_store());
        let strategy = if cfg.rag_enabled {
            ChainStrategy::Augmented {
                store: Arc::clone(&store),
                top_k: cfg.top_k,
            }
        } else {
            ChainStrategy::Direct
        };
        let generator = Arc::new(generator);

        Self {
            diagnosis: DiagnosisChain::new(Arc::clone(&generator), strategy),
            chat: ChatChain::new(generator),
            history: Arc::new(history),
            store,
            cfg,
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.cfg
    }

    pub fn history_store(&self) -> &H {
        &self.history
    }

    /// Loads the corpus if not yet loaded; returns the document count.
    pub async fn initialize(&self) -> usize {
        self.store.initialize().await.len()
    }

    /// Validates, runs the diagnosis chain and, when `userId` is present,
    /// stores the result in the background.
    ///
    /// # Errors
    /// Only [`InputError`]; generation problems surface as a fallback result
    /// with `metadata.error` set.
    pub async fn diagnose(&self, req: DiagnosisRequest) -> Result<DiagnosisResponse, InputError> {
        req.validate()?;
        self.initialize().await;

        info!(
            symptoms = req.symptoms.len(),
            answers = req.answers.len(),
            "diagnosis request"
        );
        let DiagnosisRequest {
            symptoms,
            answers,
            user_id,
        } = req;
        let input = ChainInput { symptoms, answers };
        let out = self.diagnosis.invoke(&input).await;
        let metadata = ResponseMetadata::from(&out.metadata);

        if let Some(user_id) = user_id {
            let entry = HistoryEntry {
                user_id,
                symptoms: input.symptoms,
                answers: input.answers,
                result: out.result.clone(),
                metadata: HistoryMetadata {
                    timestamp: Utc::now(),
                    processing_time_ms: metadata.processing_time_ms,
                    rag_used: metadata.rag_used,
                    sources_count: metadata.sources_count,
                    llm_tokens: metadata.llm_tokens,
                    error: metadata.error.clone(),
                    version: RECORD_VERSION.to_string(),
                },
            };
            self.persist(entry);
        }

        Ok(DiagnosisResponse {
            recipes: vec![Recipe::from_diagnosis(&out.result)],
            diagnosis: out.result,
            metadata,
        })
    }

    /// Best-effort, detached; failures are only logged.
    fn persist(&self, entry: HistoryEntry) {
        let history = Arc::clone(&self.history);
        tokio::spawn(async move {
            let key = entry.key();
            if let Err(e) = history.save(entry).await {
                warn!(key = %key, error = %e, "failed to store diagnosis");
            }
        });
    }

    /// # Errors
    /// [`InputError::BlankMessage`] for an empty message.
    pub async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, InputError> {
        req.validate()?;
        let out = self.chat.invoke(&req.message, req.diagnosis.as_ref()).await;
        Ok(ChatResponse {
            response: out.response,
            metadata: out.metadata,
        })
    }

    /// Last diagnoses of `user_id`, newest first, capped at the configured
    /// history limit. A failing store yields an empty list.
    ///
    /// # Errors
    /// [`InputError::BlankUserId`] for a blank id.
    pub async fn history(&self, user_id: &str) -> Result<Vec<HistorySummary>, InputError> {
        if user_id.trim().is_empty() {
            return Err(InputError::BlankUserId);
        }
        match self.history.recent(user_id, self.cfg.history_limit).await {
            Ok(entries) => Ok(entries.iter().map(HistorySummary::from).collect()),
            Err(e) => {
                warn!(user_id, error = %e, "history lookup failed");
                Ok(Vec::new())
            }
        }
    }

    pub fn status(&self) -> ServiceStatus {
        let documents = self.store.documents().map_or(0, <[_]>::len);
        ServiceStatus {
            rag: if self.store.is_initialized() {
                "active"
            } else {
                "initializing"
            },
            documents,
            strategy: self.diagnosis.strategy().name(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(symptoms: &[&str]) -> DiagnosisRequest {
        DiagnosisRequest {
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn diagnosis_request_validation() {
        assert_eq!(request(&[]).validate(), Err(InputError::NoSymptoms));
        assert_eq!(
            request(&["ok", "  "]).validate(),
            Err(InputError::BlankSymptom { index: 1 })
        );

        let mut r = request(&["stress"]);
        r.answers.insert(" ".into(), true);
        assert_eq!(r.validate(), Err(InputError::BlankAnswerKey));

        let mut r = request(&["stress"]);
        r.user_id = Some(String::new());
        assert_eq!(r.validate(), Err(InputError::BlankUserId));
        assert_eq!(r.validate().unwrap_err().status().as_u16(), 400);

        r.user_id = Some("u1".into());
        assert!(r.validate().is_ok());
    }

    #[test]
    fn request_accepts_user_answers_alias() {
        let r: DiagnosisRequest = serde_json::from_str(
            r#"{"symptoms":["cold"],"userAnswers":{"F8":true},"userId":"u9"}"#,
        )
        .unwrap();
        assert_eq!(r.answers.get("F8"), Some(&true));
        assert_eq!(r.user_id.as_deref(), Some("u9"));
    }

    #[test]
    fn chat_request_needs_a_message() {
        let blank = ChatRequest {
            message: " \n".into(),
            diagnosis: None,
        };
        assert_eq!(blank.validate(), Err(InputError::BlankMessage));
    }
}
