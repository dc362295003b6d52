use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{
    ConfigError, Result, validate_http_endpoint, validate_range_f32,
};

/// Configuration for a generation-service invocation.
///
/// # Fields
///
/// - `provider`: Which backend to use (OpenAI or Ollama).
/// - `model`: The model identifier (e.g., `"gpt-3.5-turbo"`, `"qwen3:14b"`).
/// - `endpoint`: Base URL of the service (no path suffix).
/// - `api_key`: Optional API key for providers that require authentication.
/// - `max_tokens`: Maximum number of tokens to generate.
/// - `temperature`: Controls randomness (0.0 = deterministic).
/// - `top_p`: Nucleus sampling cutoff.
/// - `timeout_secs`: Request timeout in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The backend (OpenAI or Ollama).
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// Base URL of the inference service.
    pub endpoint: String,

    /// Optional API key for authentication (OpenAI).
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Checks the config for obvious mistakes before any client is built.
    ///
    /// # Errors
    /// - [`ConfigError::EmptyModel`] if `model` is blank
    /// - [`ConfigError::InvalidFormat`] if `endpoint` has no http/https scheme
    /// - [`ConfigError::OutOfRange`] for `temperature` outside `0..=2` or
    ///   `top_p` outside `0..=1`
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("endpoint", &self.endpoint)?;
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0, "expected 0.0..=2.0")?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0, "expected 0.0..=1.0")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::AiLlmError;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "gpt-3.5-turbo".into(),
            endpoint: "https://api.openai.com".into(),
            api_key: Some("sk-test".into()),
            max_tokens: Some(1000),
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(30),
        }
    }

    #[test]
    fn accepts_sane_config() {
        assert!(cfg().validate().is_ok());
    }

    #[test]
    fn rejects_blank_model_and_bad_ranges() {
        let mut c = cfg();
        c.model = "  ".into();
        assert!(matches!(
            c.validate(),
            Err(AiLlmError::Config(ConfigError::EmptyModel))
        ));

        let mut c = cfg();
        c.temperature = Some(3.0);
        assert!(matches!(
            c.validate(),
            Err(AiLlmError::Config(ConfigError::OutOfRange { field: "temperature", .. }))
        ));

        let mut c = cfg();
        c.endpoint = "localhost:11434".into();
        assert!(c.validate().is_err());
    }
}
