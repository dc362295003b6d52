//! Generation-service client shared by the diagnosis workspace.
//!
//! - [`LlmService`]: one provider client (OpenAI-compatible or Ollama) built
//!   from [`LlmModelConfig`], with a bounded per-call timeout.
//! - [`TextGenerator`]: the seam chains depend on instead of the concrete service.
//! - [`HealthService`]: resilient provider probes.
//! - [`telemetry`]: tracing layer and env filter used by the binary.
//!
//! Configuration is env-driven, see [`config::default_config`].

pub mod config;
pub mod error_handler;
pub mod generator;
pub mod health_service;
pub mod llm_service;
pub mod services;
pub mod telemetry;
pub mod types;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, ConfigError, ProviderError, ProviderErrorKind};
pub use generator::TextGenerator;
pub use health_service::{HealthService, HealthStatus};
pub use llm_service::LlmService;
pub use types::{ChatMessage, ChatRole, LlmResponse, LlmUsage};
