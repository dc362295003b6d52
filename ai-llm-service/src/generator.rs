//! Seam between generation callers and the concrete service.

use std::future::Future;
use std::sync::Arc;

use crate::error_handler::AiLlmError;
use crate::types::{ChatMessage, LlmResponse};

/// Anything that can turn an ordered conversation into one completed reply.
///
/// [`crate::LlmService`] is the production implementation; chains accept any
/// implementor so they can run against in-process stand-ins.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<LlmResponse, AiLlmError>> + Send;
}

impl<G: TextGenerator> TextGenerator for Arc<G> {
    fn generate(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<LlmResponse, AiLlmError>> + Send {
        (**self).generate(messages)
    }
}
