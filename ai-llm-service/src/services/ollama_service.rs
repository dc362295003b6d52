//! Local Ollama client (`POST {endpoint}/api/chat`, `stream=false`).
//!
//! Token counts come from `prompt_eval_count` / `eval_count` when the runtime
//! reports them; a reply with neither carries no usage.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{WireMessage, base_url, decode_error, rejected, request_timeout};
use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind},
    types::{ChatMessage, LlmResponse, LlmUsage},
};

#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    chat_url: String,
}

impl OllamaService {
    /// # Errors
    /// `InvalidProvider` / `InvalidEndpoint` for a config that cannot target
    /// Ollama; [`AiLlmError::HttpTransport`] if the client cannot be built.
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(
                ProviderError::new(Provider::Ollama, ProviderErrorKind::InvalidProvider).into(),
            );
        }
        let base = base_url(Provider::Ollama, &cfg.endpoint)?;
        let client = reqwest::Client::builder()
            .timeout(request_timeout(&cfg))
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            chat_url: format!("{base}/api/chat"),
            cfg,
        })
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Non-streaming chat. `max_tokens` is sent as `num_predict`.
    ///
    /// # Errors
    /// Upstream non-2xx (`HttpStatus`), transport failures, an undecodable
    /// body (`Decode`) or a reply without a message (`EmptyChoices`).
    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse, AiLlmError> {
        let started = Instant::now();
        let body = OllamaChat::new(&self.cfg, messages);
        debug!(messages = messages.len(), url = %self.chat_url, "sending chat");

        let resp = self.client.post(&self.chat_url).json(&body).send().await?;
        if !resp.status().is_success() {
            let elapsed = started.elapsed().as_millis();
            return Err(rejected(Provider::Ollama, &self.chat_url, resp, elapsed).await);
        }

        let out: OllamaReply = resp
            .json()
            .await
            .map_err(|e| decode_error(Provider::Ollama, format!("{e}; is `stream` disabled?")))?;
        let usage = out.usage();
        let Some(message) = out.message else {
            return Err(ProviderError::new(Provider::Ollama, ProviderErrorKind::EmptyChoices).into());
        };

        debug!(latency_ms = started.elapsed().as_millis(), "chat reply received");

        Ok(LlmResponse {
            content: message.content,
            usage,
            model: out.model.unwrap_or_else(|| self.cfg.model.clone()),
            finish_reason: out.done_reason.unwrap_or_else(|| "stop".into()),
        })
    }
}

#[derive(Debug, Serialize)]
struct OllamaChat<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    options: Sampling,
}

impl<'a> OllamaChat<'a> {
    fn new(cfg: &'a LlmModelConfig, messages: &'a [ChatMessage]) -> Self {
        Self {
            model: &cfg.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            stream: false,
            options: Sampling {
                temperature: cfg.temperature,
                top_p: cfg.top_p,
                num_predict: cfg.max_tokens,
            },
        }
    }
}

/// Subset of Ollama `options`.
#[derive(Debug, Default, Serialize)]
struct Sampling {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OllamaReply {
    model: Option<String>,
    message: Option<ReplyMessage>,
    done_reason: Option<String>,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

impl OllamaReply {
    fn usage(&self) -> Option<LlmUsage> {
        if self.prompt_eval_count.is_none() && self.eval_count.is_none() {
            return None;
        }
        let prompt_tokens = self.prompt_eval_count.unwrap_or(0);
        let completion_tokens = self.eval_count.unwrap_or(0);
        Some(LlmUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_needs_at_least_one_count() {
        let none: OllamaReply = serde_json::from_str(r#"{"message":{"content":"x"}}"#).unwrap();
        assert!(none.usage().is_none());

        let some: OllamaReply =
            serde_json::from_str(r#"{"prompt_eval_count":30,"eval_count":12}"#).unwrap();
        assert_eq!(some.usage().map(|u| u.total_tokens), Some(42));
    }

    #[test]
    fn max_tokens_maps_to_num_predict() {
        let cfg = LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "qwen3:8b".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: Some(512),
            temperature: None,
            top_p: None,
            timeout_secs: None,
        };
        let msgs = [ChatMessage::user("hi")];
        let body = serde_json::to_value(OllamaChat::new(&cfg, &msgs)).unwrap();
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 512);
        assert!(body["options"].get("temperature").is_none());
    }
}
