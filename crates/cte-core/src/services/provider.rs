use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use super::prompts::{MASTER_PROMPT, system_instruction_for};
use crate::models::context::CteContext;
use crate::models::message::{Attachment, Citation, Message};

/// Increments emitted while a response streams in.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Text(String),
    Citations(Vec<Citation>),
}

/// Type alias for response streams.
pub type ProviderStream = BoxStream<'static, Result<StreamEvent, ProviderError>>;

/// Provider failures, classified just finely enough to pick a user notice.
/// Classification never changes behavior — there are no automatic retries.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("rate limit exceeded")]
    RateLimited,

    #[error("service or model not found")]
    NotFound,

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Classify a raw transport error message the way the service always
    /// has: scan for the well-known status codes, else generic.
    pub fn classify(raw: &str) -> Self {
        let upper = raw.to_uppercase();
        if upper.contains("429") {
            ProviderError::RateLimited
        } else if upper.contains("404") {
            ProviderError::NotFound
        } else {
            ProviderError::Other(raw.to_string())
        }
    }

    /// Inline transcript notice appended to whatever partial content the
    /// turn produced. Kept in the transcript, next to the turn it broke.
    pub fn user_notice(&self) -> String {
        let mut notice = String::from("\n\n**[Error de conexión]**");
        match self {
            ProviderError::RateLimited => {
                notice.push_str("\n🛑 **Límite de Cuota Excedido (429)**.");
            }
            ProviderError::NotFound => {
                notice.push_str("\n⚠️ **Error de Servicio (404)**.");
            }
            ProviderError::Other(_) => {
                notice.push_str("\n⚠️ Hubo un problema al generar el resto de la respuesta.");
            }
        }
        notice
    }
}

/// Everything a provider call needs, snapshotted at send time so later
/// context or project switches cannot retroactively alter an in-flight call.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub prompt: String,
    pub attachment: Option<Attachment>,
    pub context: CteContext,
    /// Bounded recent history — the full conversation is never replayed.
    pub history: Vec<Message>,
    pub system_instruction: String,
}

/// Configuration injected into the controller at construction. Replaces the
/// module-level mock switch and prompt globals of earlier builds.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// How many trailing messages accompany each request.
    pub history_limit: usize,
    /// Base system prompt fused with the per-context role instruction.
    pub master_prompt: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            history_limit: 6,
            master_prompt: MASTER_PROMPT.to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn system_instruction(&self, context: CteContext) -> String {
        system_instruction_for(&self.master_prompt, context)
    }
}

/// The remote model call, reduced to its interface boundary: a request in,
/// an asynchronous sequence of increments out. Implementations own
/// transport, timeouts, and authentication.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn stream(&self, request: ProviderRequest) -> Result<ProviderStream, ProviderError>;
}
