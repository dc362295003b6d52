use std::collections::HashSet;
use std::time::Duration;

use ai_llm_service::{AiLlmError, ChatMessage, LlmResponse, LlmUsage, TextGenerator};
use herbal_chain::{
    CHAT_APOLOGY, ChainConfig, ChainError, ChatRequest, DiagnosisRequest, DiagnosisService,
    HistoryEntry, HistoryStore, InputError,
};

const REPLY: &str = r#"```json
{"category":"Rhythm care","statusSummary":"Hormonal rhythm needs support.",
 "recommendedHerbs":["mugwort","angelica","safflower"],"benefits":["warmth","balance"],
 "advice":"Keep a steady daily rhythm.","instructions":"Steam 20 minutes in the evening.",
 "duration":"1 month","frequency":"3 times a week","precautions":"Avoid during pregnancy."}
```"#;

/// Generation stand-in: fixed reply, or a 503 when `reply` is `None`.
struct Stub {
    reply: Option<&'static str>,
}

impl TextGenerator for Stub {
    async fn generate(&self, _: &[ChatMessage]) -> Result<LlmResponse, AiLlmError> {
        match self.reply {
            Some(content) => Ok(LlmResponse {
                content: content.into(),
                usage: Some(LlmUsage {
                    prompt_tokens: 300,
                    completion_tokens: 120,
                    total_tokens: 420,
                }),
                model: "stub".into(),
                finish_reason: "stop".into(),
            }),
            None => Err(AiLlmError::Timeout(Duration::from_secs(30))),
        }
    }
}

/// History store whose writes and reads always fail.
struct BrokenHistory;

impl HistoryStore for BrokenHistory {
    async fn save(&self, _: HistoryEntry) -> Result<String, ChainError> {
        Err(ChainError::Storage("disk full".into()))
    }

    async fn recent(&self, _: &str, _: usize) -> Result<Vec<HistoryEntry>, ChainError> {
        Err(ChainError::Storage("disk full".into()))
    }
}

fn hormonal_request(user: Option<&str>) -> DiagnosisRequest {
    DiagnosisRequest {
        symptoms: vec!["irregular cycle".into(), "cold hands".into()],
        answers: ["M6", "M7", "M8", "M9"]
            .into_iter()
            .map(|id| (id.to_string(), true))
            .collect(),
        user_id: user.map(str::to_string),
    }
}

async fn wait_for_history(svc: &DiagnosisService<Stub>, user: &str, n: usize) -> usize {
    for _ in 0..100 {
        let got = svc.history(user).await.unwrap().len();
        if got >= n {
            return got;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    svc.history(user).await.unwrap().len()
}

#[tokio::test]
async fn hormonal_answers_end_to_end() {
    let svc = DiagnosisService::new(ChainConfig::default(), Stub { reply: Some(REPLY) });
    assert_eq!(svc.status().rag, "initializing");

    let out = svc.diagnose(hormonal_request(None)).await.unwrap();

    assert_eq!(out.diagnosis.category, "Rhythm care");
    assert_eq!(out.recipes.len(), 1);
    assert_eq!(out.recipes[0].name, "Rhythm care blend");
    let meta = &out.metadata;
    assert!(meta.rag_used && meta.error.is_none());
    assert!(meta.sources_count > 0 && meta.sources_count <= 5);
    assert_eq!(meta.llm_tokens, Some(420));
    assert_eq!(meta.model.as_deref(), Some("stub"));
    assert_eq!(meta.finish_reason.as_deref(), Some("stop"));
    let rec = meta.recommendation.as_ref().unwrap();
    assert_eq!(rec.primary_recipe, "Rhythm Circulation Steam");
    assert_eq!(rec.confidence, 0.8);

    let status = svc.status();
    assert_eq!(status.rag, "active");
    assert_eq!(status.documents, 35);
    assert_eq!(status.strategy, "augmented");
}

#[tokio::test]
async fn generation_failure_returns_complete_fallback() {
    let svc = DiagnosisService::new(ChainConfig::default(), Stub { reply: None });
    let mut req = hormonal_request(None);
    req.symptoms = vec!["menstrual pain".into()];

    let out = svc.diagnose(req).await.unwrap();

    assert_eq!(out.diagnosis.category, "Hormonal balance and women's health");
    assert!(out.metadata.error.as_deref().is_some_and(|e| !e.is_empty()));
    assert!(!out.metadata.rag_used);
    assert_eq!(out.metadata.sources_count, 0);
    assert!(out.metadata.finish_reason.is_none());
    assert!(out.diagnosis.validate().is_ok());
    assert_eq!(out.recipes[0].ingredients, out.diagnosis.recommended_herbs);
}

#[tokio::test]
async fn direct_strategy_when_retrieval_disabled() {
    let cfg = ChainConfig {
        rag_enabled: false,
        ..ChainConfig::default()
    };
    let svc = DiagnosisService::new(cfg, Stub { reply: Some(REPLY) });
    let out = svc.diagnose(hormonal_request(None)).await.unwrap();

    assert!(!out.metadata.rag_used);
    assert_eq!(out.metadata.sources_count, 0);
    assert!(out.metadata.recommendation.is_none());
    assert_eq!(svc.status().strategy, "direct");
}

#[tokio::test]
async fn history_is_saved_per_user_and_capped() {
    let cfg = ChainConfig {
        history_limit: 3,
        ..ChainConfig::default()
    };
    let svc = DiagnosisService::new(cfg, Stub { reply: Some(REPLY) });

    for _ in 0..4 {
        svc.diagnose(hormonal_request(Some("user-1"))).await.unwrap();
    }
    svc.diagnose(hormonal_request(Some("user-2"))).await.unwrap();
    svc.diagnose(hormonal_request(None)).await.unwrap();

    assert_eq!(wait_for_history(&svc, "user-1", 3).await, 3);
    assert_eq!(wait_for_history(&svc, "user-2", 1).await, 1);
    while svc.history_store().len().await < 5 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(svc.history_store().len().await, 5);

    let summaries = svc.history("user-1").await.unwrap();
    assert!(summaries.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    assert!(summaries.iter().all(|s| s.id.starts_with("diagnosis_user-1_")));
    assert!(summaries.iter().all(|s| s.category == "Rhythm care" && s.rag_used));

    assert_eq!(svc.history("  ").await, Err(InputError::BlankUserId));
}

#[tokio::test]
async fn back_to_back_diagnoses_keep_distinct_ids() {
    let cfg = ChainConfig {
        rag_enabled: false,
        ..ChainConfig::default()
    };
    let svc = DiagnosisService::new(cfg, Stub { reply: Some(REPLY) });
    for _ in 0..5 {
        svc.diagnose(hormonal_request(Some("u"))).await.unwrap();
    }

    assert_eq!(wait_for_history(&svc, "u", 5).await, 5);
    let ids: HashSet<String> = svc
        .history("u")
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids.len(), 5);
}

#[tokio::test]
async fn storage_failures_never_fail_the_response() {
    let svc = DiagnosisService::with_history(
        ChainConfig::default(),
        Stub { reply: Some(REPLY) },
        BrokenHistory,
    );
    let out = svc.diagnose(hormonal_request(Some("user-1"))).await.unwrap();
    assert!(out.metadata.error.is_none());
    assert!(svc.history("user-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_input_is_rejected_before_generation() {
    let svc = DiagnosisService::new(ChainConfig::default(), Stub { reply: Some(REPLY) });
    let err = svc.diagnose(DiagnosisRequest::default()).await.unwrap_err();
    assert_eq!(err, InputError::NoSymptoms);
    assert_eq!(svc.status().rag, "initializing");
}

#[tokio::test]
async fn chat_replies_and_apologizes_on_failure() {
    let ok = DiagnosisService::new(ChainConfig::default(), Stub { reply: Some("Sip warm ginger tea.") });
    let reply = ok
        .chat(ChatRequest {
            message: "What helps cold hands?".into(),
            diagnosis: None,
        })
        .await
        .unwrap();
    assert_eq!(reply.response, "Sip warm ginger tea.");
    assert_eq!(reply.metadata.llm_usage.map(|u| u.total_tokens), Some(420));

    let down = DiagnosisService::new(ChainConfig::default(), Stub { reply: None });
    let reply = down
        .chat(ChatRequest {
            message: "hello".into(),
            diagnosis: None,
        })
        .await
        .unwrap();
    assert_eq!(reply.response, CHAT_APOLOGY);
    assert!(reply.metadata.error.is_some());

    let err = down.chat(ChatRequest::default()).await.unwrap_err();
    assert_eq!(err, InputError::BlankMessage);
}
