//! Provider clients and the request plumbing they share.

pub mod ollama_service;
pub mod open_ai_service;

use std::time::Duration;

use serde::Serialize;
use tracing::error;

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet},
    types::ChatMessage,
};

/// Per-request timeout when the config leaves it unset.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn request_timeout(cfg: &LlmModelConfig) -> Duration {
    cfg.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs)
}

/// Endpoint without the trailing slash. Anything but http(s) is rejected.
pub(crate) fn base_url(provider: Provider, endpoint: &str) -> Result<String, AiLlmError> {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.trim_end_matches('/').to_string())
    } else {
        Err(ProviderError::new(
            provider,
            ProviderErrorKind::InvalidEndpoint(endpoint.to_string()),
        )
        .into())
    }
}

pub(crate) fn decode_error(provider: Provider, detail: String) -> AiLlmError {
    ProviderError::new(provider, ProviderErrorKind::Decode(detail)).into()
}

/// Consumes a non-2xx response and turns it into a provider error carrying a
/// body snippet.
pub(crate) async fn rejected(
    provider: Provider,
    url: &str,
    resp: reqwest::Response,
    latency_ms: u128,
) -> AiLlmError {
    let status = resp.status();
    let snippet = make_snippet(&resp.text().await.unwrap_or_default());

    error!(
        %provider,
        %status,
        url,
        %snippet,
        latency_ms,
        "generation request rejected upstream"
    );

    ProviderError::new(
        provider,
        ProviderErrorKind::HttpStatus(HttpError {
            status,
            url: url.to_string(),
            snippet,
        }),
    )
    .into()
}

/// `{role, content}` as both providers expect it on the wire.
#[derive(Debug, Serialize)]
pub(crate) struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(m: &'a ChatMessage) -> Self {
        Self {
            role: m.role.as_str(),
            content: &m.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_strips_slash_and_rejects_other_schemes() {
        assert_eq!(
            base_url(Provider::Ollama, " http://localhost:11434/ ").unwrap(),
            "http://localhost:11434"
        );
        assert!(base_url(Provider::OpenAI, "").is_err());
        assert!(base_url(Provider::OpenAI, "ftp://x").is_err());
    }
}
