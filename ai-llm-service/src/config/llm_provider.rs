use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Represents the provider (backend) used for text generation.
///
/// Parsed from `LLM_KIND` (`openai`, `chatgpt`, `ollama`; case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime.
    Ollama,
    /// OpenAI-compatible chat-completions API.
    OpenAI,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
