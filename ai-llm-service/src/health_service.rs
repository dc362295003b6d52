//! Provider health probes.
//!
//! Both providers expose a model listing, so a probe is one authenticated
//! `GET` plus a lookup of the configured model in the reply:
//!
//! | provider | listing              | model names      |
//! |----------|----------------------|------------------|
//! | Ollama   | `{endpoint}/api/tags`  | `models[].name`  |
//! | OpenAI   | `{endpoint}/v1/models` | `data[].id`      |
//!
//! [`HealthService::check`] never fails; any problem becomes `ok = false`
//! with the error text in `message`.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, HealthError, HttpError, make_snippet},
};

/// Serializable outcome of one probe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: Option<String>,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Where to list models for a provider and how to read the names back.
struct Listing {
    path: &'static str,
    array: &'static str,
    name: &'static str,
}

impl Listing {
    fn for_provider(provider: LlmProvider) -> Self {
        match provider {
            LlmProvider::Ollama => Self {
                path: "/api/tags",
                array: "models",
                name: "name",
            },
            LlmProvider::OpenAI => Self {
                path: "/v1/models",
                array: "data",
                name: "id",
            },
        }
    }

    /// `None` when the reply has no listing at all.
    fn contains(&self, body: &Value, model: &str) -> Option<bool> {
        let items = body.get(self.array)?.as_array()?;
        Some(
            items
                .iter()
                .any(|m| m.get(self.name).and_then(Value::as_str) == Some(model)),
        )
    }
}

/// Reuses one HTTP client across probes.
#[derive(Debug)]
pub struct HealthService {
    client: reqwest::Client,
    max_timeout: Duration,
}

impl HealthService {
    /// `timeout_secs` caps every probe (default 10s).
    ///
    /// # Errors
    /// [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let max_timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(max_timeout).build()?;
        Ok(Self {
            client,
            max_timeout,
        })
    }

    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let started = Instant::now();
        match self.probe(cfg).await {
            Ok(status) => {
                info!(
                    provider = %status.provider,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(e) => {
                warn!(provider = ?cfg.provider, error = %e, "health probe failed");
                HealthStatus::new(cfg, false, started.elapsed().as_millis(), e.to_string())
            }
        }
    }

    async fn probe(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(HealthError::InvalidEndpoint(cfg.endpoint.clone()).into());
        }

        let listing = Listing::for_provider(cfg.provider);
        let url = format!("{}{}", endpoint.trim_end_matches('/'), listing.path);
        let timeout = cfg
            .timeout_secs
            .map_or(self.max_timeout, Duration::from_secs)
            .min(self.max_timeout);

        let mut req = self.client.get(&url).timeout(timeout);
        if let Some(key) = cfg.api_key.as_deref() {
            let auth = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| HealthError::Decode(format!("API key is not a valid header: {e}")))?;
            req = req.header(AUTHORIZATION, auth);
        } else if cfg.provider == LlmProvider::OpenAI {
            return Err(HealthError::Decode("missing OpenAI API key".into()).into());
        }

        let started = Instant::now();
        debug!(url = %url, "probing model listing");
        let resp = req.send().await?;
        let latency = started.elapsed().as_millis();

        let status = resp.status();
        if !status.is_success() {
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })
            .into());
        }

        // A reachable server with an odd listing still counts as up.
        let body: Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                return Ok(HealthStatus::new(
                    cfg,
                    true,
                    latency,
                    format!("reachable; listing could not be decoded: {e}"),
                ));
            }
        };

        Ok(match listing.contains(&body, &cfg.model) {
            Some(true) => HealthStatus::new(cfg, true, latency, "healthy; model is available"),
            Some(false) => HealthStatus::new(
                cfg,
                false,
                latency,
                format!("up, but `{}` is not listed at {}", cfg.model, listing.path),
            ),
            None => HealthStatus::new(cfg, true, latency, "healthy; listing has no models field"),
        })
    }
}
