//! OpenAI-compatible chat-completions client (`POST {endpoint}/v1/chat/completions`).
//!
//! Non-streaming. The API key is sent as a default `Authorization` header, so
//! it is checked once at construction.

use std::time::Instant;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{WireMessage, base_url, decode_error, rejected, request_timeout};
use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind},
    types::{ChatMessage, LlmResponse, LlmUsage},
};

#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    completions_url: String,
}

impl OpenAiService {
    /// # Errors
    /// `InvalidProvider`, `MissingApiKey` or `InvalidEndpoint` for a config that
    /// cannot target OpenAI; [`AiLlmError::HttpTransport`] if the client
    /// cannot be built.
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let fail = |kind| AiLlmError::from(ProviderError::new(Provider::OpenAI, kind));

        if cfg.provider != LlmProvider::OpenAI {
            return Err(fail(ProviderErrorKind::InvalidProvider));
        }
        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or_else(|| fail(ProviderErrorKind::MissingApiKey))?;
        let base = base_url(Provider::OpenAI, &cfg.endpoint)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
            decode_error(Provider::OpenAI, format!("API key is not a valid header: {e}"))
        })?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let timeout = request_timeout(&cfg);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        info!(
            model = %cfg.model,
            endpoint = %base,
            timeout_secs = timeout.as_secs(),
            "OpenAI client ready"
        );

        Ok(Self {
            client,
            completions_url: format!("{base}/v1/chat/completions"),
            cfg,
        })
    }

    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Sends `messages` in order and returns the first choice that carries text.
    ///
    /// # Errors
    /// Upstream non-2xx (`HttpStatus`), transport failures, an undecodable
    /// body (`Decode`) or a reply without text (`EmptyChoices`).
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse, AiLlmError> {
        let started = Instant::now();
        let body = CompletionRequest::new(&self.cfg, messages);
        debug!(messages = messages.len(), url = %self.completions_url, "sending completion");

        let resp = self
            .client
            .post(&self.completions_url)
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            let elapsed = started.elapsed().as_millis();
            return Err(rejected(Provider::OpenAI, &self.completions_url, resp, elapsed).await);
        }

        let out: CompletionResponse = resp.json().await.map_err(|e| {
            decode_error(
                Provider::OpenAI,
                format!("{e}; expected `choices[].message.content`"),
            )
        })?;

        let Some((content, finish_reason)) = out
            .choices
            .into_iter()
            .find_map(|c| c.message.content.map(|text| (text, c.finish_reason)))
        else {
            return Err(ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices).into());
        };

        let usage = out.usage.map(LlmUsage::from);
        debug!(
            latency_ms = started.elapsed().as_millis(),
            total_tokens = usage.map_or(0, |u| u.total_tokens),
            "completion received"
        );

        Ok(LlmResponse {
            content,
            usage,
            model: out.model.unwrap_or_else(|| self.cfg.model.clone()),
            finish_reason: finish_reason.unwrap_or_else(|| "unknown".into()),
        })
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> CompletionRequest<'a> {
    fn new(cfg: &'a LlmModelConfig, messages: &'a [ChatMessage]) -> Self {
        Self {
            model: &cfg.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<Usage> for LlmUsage {
    fn from(u: Usage) -> Self {
        Self {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}
