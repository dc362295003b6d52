//! Shared generation service bound to one provider config.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Builds the provider HTTP client once and reuses it for every call.
//! - Every call is bounded by the configured timeout; elapsed calls surface as
//!   [`AiLlmError::Timeout`].
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{ChatMessage, LlmService, config::default_config::config_from_env};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ai_llm_service::AiLlmError> {
//!     let svc = Arc::new(LlmService::new(config_from_env()?, Some(10))?);
//!     let out = svc
//!         .chat(&[ChatMessage::system("Be brief."), ChatMessage::user("Hello")])
//!         .await?;
//!     println!("{}", out.content);
//!     println!("{:?}", svc.health().await);
//!     Ok(())
//! }
//! ```

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    generator::TextGenerator,
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
    types::{ChatMessage, LlmResponse},
};

/// Provider client selected at construction.
#[derive(Debug)]
enum ProviderClient {
    OpenAI(OpenAiService),
    Ollama(OllamaService),
}

/// Generation service for a single model config.
#[derive(Debug)]
pub struct LlmService {
    cfg: LlmModelConfig,
    client: ProviderClient,
    health: HealthService,
    timeout: Duration,
}

impl LlmService {
    /// Validates `cfg` and builds the provider client plus a health checker.
    ///
    /// - `health_timeout_secs`: optional timeout for the health checker.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if validation fails or an HTTP client cannot be built.
    pub fn new(cfg: LlmModelConfig, health_timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        cfg.validate()?;

        let client = match cfg.provider {
            LlmProvider::OpenAI => ProviderClient::OpenAI(OpenAiService::new(cfg.clone())?),
            LlmProvider::Ollama => ProviderClient::Ollama(OllamaService::new(cfg.clone())?),
        };
        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(60));

        Ok(Self {
            cfg,
            client,
            health: HealthService::new(health_timeout_secs)?,
            timeout,
        })
    }

    /// Sends the ordered messages and returns the completed generation.
    ///
    /// # Errors
    /// - [`AiLlmError::Timeout`] if no reply arrives within the configured timeout
    /// - any provider/transport error from the underlying client
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse, AiLlmError> {
        let started = Instant::now();
        let call = async {
            match &self.client {
                ProviderClient::OpenAI(cli) => cli.chat(messages).await,
                ProviderClient::Ollama(cli) => cli.chat(messages).await,
            }
        };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => {
                if let Ok(out) = &result {
                    info!(
                        provider = ?self.cfg.provider,
                        model = %out.model,
                        finish_reason = %out.finish_reason,
                        latency_ms = started.elapsed().as_millis(),
                        "generation completed"
                    );
                }
                result
            }
            Err(_) => {
                warn!(
                    provider = ?self.cfg.provider,
                    model = %self.cfg.model,
                    timeout_secs = self.timeout.as_secs(),
                    "generation timed out"
                );
                Err(AiLlmError::Timeout(self.timeout))
            }
        }
    }

    /// Health snapshot of the configured provider. Never fails.
    pub async fn health(&self) -> HealthStatus {
        self.health.check(&self.cfg).await
    }

    /// Returns the active model config.
    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }
}

impl TextGenerator for LlmService {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<LlmResponse, AiLlmError> {
        self.chat(messages).await
    }
}
