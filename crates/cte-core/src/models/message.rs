use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A file attached to a user message. Immutable once built; only the
/// ingestion boundary in `services::attachment` produces these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    /// Base64-encoded payload.
    pub data: String,
}

/// A grounding citation supplied by the provider alongside generated text.
///
/// Citations accumulate in arrival order and are intentionally never
/// deduplicated: repeated increments referencing the same source stay
/// repeated in the finalized message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source_uri: String,
    pub title: String,
}

/// Millisecond-timestamp message id, unique and monotonically increasing
/// within a conversation so that a creation time can be read back off it.
pub type MessageId = i64;

/// Allocates message ids. Two messages created inside the same millisecond
/// get consecutive ids instead of colliding.
#[derive(Debug, Default)]
pub struct MessageIdAllocator {
    last: MessageId,
}

impl MessageIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> MessageId {
        let now = Utc::now().timestamp_millis();
        self.last = if now > self.last { now } else { self.last + 1 };
        self.last
    }
}

/// A single entry in the visible conversation transcript.
///
/// Lifecycle: model messages are created empty with `is_streaming = true`,
/// mutated in place while the provider streams (content grows, citations
/// grow), and frozen once `is_streaming` goes false. User messages are frozen
/// from the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default)]
    pub is_streaming: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
}

impl Message {
    pub fn user(id: MessageId, content: impl Into<String>, attachment: Option<Attachment>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            attachment,
            is_streaming: false,
            citations: Vec::new(),
        }
    }

    /// Empty placeholder for a model turn that is about to stream.
    pub fn streaming_placeholder(id: MessageId) -> Self {
        Self {
            id,
            role: Role::Model,
            content: String::new(),
            attachment: None,
            is_streaming: true,
            citations: Vec::new(),
        }
    }

    /// Non-streaming model message, used for system-style notices.
    pub fn model_notice(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Model,
            content: content.into(),
            attachment: None,
            is_streaming: false,
            citations: Vec::new(),
        }
    }
}
