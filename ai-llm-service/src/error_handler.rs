//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library, and groups domain-specific errors in nested enums ([`ConfigError`],
//! [`ProviderError`], [`HealthError`]). Small helpers for reading/validating
//! environment variables are provided and return the unified [`Result<T>`] alias.
//!
//! All messages include the prefix `[AI LLM Service]` to simplify attribution in logs.
//!
//! Callers that need an HTTP-like classification of a failure (for example to
//! record it next to a degraded response) use [`AiLlmError::status`].

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
///
/// Variants wrap domain-specific enums (config/provider/health) and a few common
/// cases (HTTP transport, timeouts).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup/readiness).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Errors reported while talking to a concrete provider.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Health-check/connectivity/decoding errors.
    #[error(transparent)]
    Health(#[from] HealthError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Operation exceeded the configured timeout.
    #[error("[AI LLM Service] operation timed out after {0:?}")]
    Timeout(Duration),
}

impl AiLlmError {
    /// HTTP-like status describing this failure.
    ///
    /// Upstream statuses are passed through; local failures are mapped onto the
    /// closest gateway status (`502` for transport/decoding, `504` for timeouts,
    /// `500` for configuration).
    pub fn status(&self) -> StatusCode {
        match self {
            AiLlmError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AiLlmError::Provider(p) => match &p.kind {
                ProviderErrorKind::HttpStatus(h) => h.status,
                ProviderErrorKind::InvalidProvider
                | ProviderErrorKind::MissingApiKey
                | ProviderErrorKind::InvalidEndpoint(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ProviderErrorKind::Decode(_) | ProviderErrorKind::EmptyChoices => {
                    StatusCode::BAD_GATEWAY
                }
            },
            AiLlmError::Health(HealthError::HttpStatus(h)) => h.status,
            AiLlmError::Health(_) => StatusCode::BAD_GATEWAY,
            AiLlmError::HttpTransport(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AiLlmError::HttpTransport(e) => e.status().unwrap_or(StatusCode::BAD_GATEWAY),
            AiLlmError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// True when the failure happened before any response was produced
    /// (timeouts and transport errors).
    pub fn is_transport(&self) -> bool {
        matches!(self, AiLlmError::HttpTransport(_) | AiLlmError::Timeout(_))
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[AI LLM Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (like ports, limits, timeouts).
    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `LLM_MAX_TOKENS`, `OLLAMA_PORT`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// Unsupported provider in `LLM_KIND`.
    #[error("[AI LLM Service] unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `OLLAMA_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI LLM Service] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `temperature`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },

    /// Model name was empty or invalid.
    #[error("[AI LLM Service] model name must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Provider a [`ProviderError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Ollama,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAI => f.write_str("OpenAI"),
            Provider::Ollama => f.write_str("Ollama"),
        }
    }
}

/// Non-success HTTP response captured for diagnostics.
#[derive(Debug, Clone)]
pub struct HttpError {
    /// Numeric HTTP status code.
    pub status: StatusCode,
    /// Request URL.
    pub url: String,
    /// Short snippet of the response body (trimmed).
    pub snippet: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

/// What went wrong while calling a provider.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderErrorKind {
    /// The config is bound to a different provider.
    #[error("invalid provider for this client")]
    InvalidProvider,

    /// Provider requires an API key but none was configured.
    #[error("missing API key")]
    MissingApiKey,

    /// The endpoint is empty or does not start with http/https.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Upstream returned a non-successful HTTP status.
    #[error("{0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("decode error: {0}")]
    Decode(String),

    /// Completion response contained no usable message.
    #[error("response contained no choices")]
    EmptyChoices,
}

/// Provider-tagged error.
#[derive(Debug, Error)]
#[error("[AI LLM Service] {provider}: {kind}")]
pub struct ProviderError {
    pub provider: Provider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: Provider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

/* ------------------------------------------------------------------------- */
/* Health errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for provider health checks.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HealthError {
    /// The endpoint is empty or does not start with http/https.
    #[error("[AI LLM Service] invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Upstream returned a non-successful HTTP status.
    #[error("[AI LLM Service] {0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("[AI LLM Service] decode error: {0}")]
    Decode(String),
}

/// Trims a response body down to a single-line snippet suitable for logs.
pub fn make_snippet(body: &str) -> String {
    const MAX: usize = 240;
    let flat: String = body
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let flat = flat.trim();
    if flat.chars().count() <= MAX {
        flat.to_string()
    } else {
        let mut s: String = flat.chars().take(MAX).collect();
        s.push('…');
        s
    }
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty environment variable.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::MissingVar`] if the
/// variable is absent or empty.
pub fn must_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Reads an optional, non-empty environment variable.
pub fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses an optional `u32` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a valid `u32`.
pub fn env_opt_u32(name: &'static str) -> Result<Option<u32>> {
    match env_opt(name) {
        Some(v) => v.trim().parse::<u32>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        None => Ok(None),
    }
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is not a valid `u64`.
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    match env_opt(name) {
        Some(v) => v.trim().parse::<u64>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/// Parses an optional `f32` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is not a valid float.
pub fn env_opt_f32(name: &'static str) -> Result<Option<f32>> {
    match env_opt(name) {
        Some(v) => v.trim().parse::<f32>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected f32",
            })
        }),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers (return unified `Result<T>`)                           */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidFormat`] when
/// the string does not start with a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// Used for `temperature` (`0.0..=2.0`) and `top_p` (`0.0..=1.0`).
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::OutOfRange`] if `value`
/// is outside `[min, max]`.
pub fn validate_range_f32(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
    detail: &'static str,
) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, detail }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_passed_through() {
        let err: AiLlmError = ProviderError::new(
            Provider::OpenAI,
            ProviderErrorKind::HttpStatus(HttpError {
                status: StatusCode::TOO_MANY_REQUESTS,
                url: "http://x/v1/chat/completions".into(),
                snippet: "rate limited".into(),
            }),
        )
        .into();
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(err.to_string().contains("429"));
        assert!(!err.is_transport());
    }

    #[test]
    fn local_failures_map_to_gateway_statuses() {
        let timeout = AiLlmError::Timeout(Duration::from_secs(3));
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(timeout.is_transport());

        let decode: AiLlmError =
            ProviderError::new(Provider::Ollama, ProviderErrorKind::Decode("bad".into())).into();
        assert_eq!(decode.status(), StatusCode::BAD_GATEWAY);

        let cfg: AiLlmError = ConfigError::EmptyModel.into();
        assert_eq!(cfg.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn snippet_is_single_line_and_bounded() {
        let body = format!("line one\nline two\t{}", "x".repeat(500));
        let s = make_snippet(&body);
        assert!(!s.contains('\n'));
        assert!(s.chars().count() <= 241);
        assert!(s.ends_with('…'));
    }

    #[test]
    fn endpoint_and_range_validation() {
        assert!(validate_http_endpoint("OPENAI_URL", "https://api.openai.com").is_ok());
        assert!(validate_http_endpoint("OPENAI_URL", "api.openai.com").is_err());
        assert!(validate_range_f32("temperature", 0.7, 0.0, 2.0, "expected 0.0..=2.0").is_ok());
        assert!(validate_range_f32("temperature", 2.5, 0.0, 2.0, "expected 0.0..=2.0").is_err());
        assert!(validate_range_f32("top_p", f32::NAN, 0.0, 1.0, "expected 0.0..=1.0").is_err());
    }
}
