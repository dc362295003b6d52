//! Default generation-service config loaded strictly from environment variables.
//!
//! The provider is chosen by `LLM_KIND` (defaults to `openai`) and the rest of
//! the fields are resolved per provider.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`          = `openai` | `ollama` (default `openai`)
//! - `LLM_TEMPERATURE`   = sampling temperature (default `0.7`)
//! - `LLM_MAX_TOKENS`    = output token budget (default `1000`)
//! - `LLM_TIMEOUT_SECS`  = request timeout (default `30`)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY` (mandatory)
//! - `OPENAI_URL`     = base URL (default `https://api.openai.com`)
//! - `OPENAI_MODEL`   = model (default `gpt-3.5-turbo`)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = model (mandatory)

use tracing::debug;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_f32, env_opt_u32, env_opt_u64, must_env,
    },
};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Builds the config for whichever provider `LLM_KIND` selects and validates it.
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`
/// - any error from the provider-specific constructor
/// - any error from [`LlmModelConfig::validate`]
pub fn config_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let provider = match env_opt("LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::OpenAI,
    };

    let cfg = match provider {
        LlmProvider::OpenAI => config_openai()?,
        LlmProvider::Ollama => config_ollama()?,
    };
    cfg.validate()?;

    debug!(
        provider = ?cfg.provider,
        model = %cfg.model,
        endpoint = %cfg.endpoint,
        "generation config resolved from env"
    );
    Ok(cfg)
}

/// Constructs a config for an OpenAI-compatible chat-completions service.
///
/// # Env
/// - `OPENAI_API_KEY` (required)
/// - `OPENAI_URL`, `OPENAI_MODEL` (optional)
pub fn config_openai() -> Result<LlmModelConfig, AiLlmError> {
    let api_key = must_env("OPENAI_API_KEY")?;
    let endpoint = env_opt("OPENAI_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
    let model = env_opt("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens: Some(env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS)),
        temperature: Some(env_opt_f32("LLM_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE)),
        top_p: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    })
}

/// Constructs a config for a local Ollama runtime.
///
/// # Env
/// - `OLLAMA_URL` or `OLLAMA_PORT` (required)
/// - `OLLAMA_MODEL` (required)
pub fn config_ollama() -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = ollama_endpoint()?;
    let model = must_env("OLLAMA_MODEL")?;

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint,
        api_key: None,
        max_tokens: Some(env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS)),
        temperature: Some(env_opt_f32("LLM_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE)),
        top_p: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    })
}

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if both are missing
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = env_opt("OLLAMA_URL") {
        return Ok(url);
    }
    if let Some(port) = env_opt("OLLAMA_PORT") {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}
