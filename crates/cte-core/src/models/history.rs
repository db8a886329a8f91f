use serde::{Deserialize, Serialize};

use super::context::CteContext;
use super::message::Message;

/// Maximum number of characters of the user prompt kept in a history
/// entry's preview line.
const QUERY_PREVIEW_LEN: usize = 80;

/// A user-defined grouping label (expediente) that tags history entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Unix milliseconds.
    pub created_at: i64,
}

/// A persisted record of one completed question/answer turn.
///
/// Immutable after creation except for deletion. `project_id` is a weak
/// reference: the project it names may have been deleted since, and readers
/// must treat that as "no project", never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub context: CteContext,
    /// Truncated copy of the triggering user prompt, for list display.
    pub query_preview: String,
    /// Always exactly two messages: the user message and the finalized
    /// model message.
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl HistoryEntry {
    pub fn new(
        id: String,
        timestamp: i64,
        context: CteContext,
        user_message: Message,
        model_message: Message,
        project_id: Option<String>,
    ) -> Self {
        Self {
            id,
            timestamp,
            context,
            query_preview: query_preview(&user_message.content),
            messages: vec![user_message, model_message],
            project_id,
        }
    }

    pub fn user_message(&self) -> &Message {
        &self.messages[0]
    }

    pub fn model_message(&self) -> &Message {
        &self.messages[1]
    }
}

/// First 80 characters of the prompt, with an ellipsis when truncated.
/// Counts characters, not bytes, so multi-byte text never splits mid-char.
pub fn query_preview(content: &str) -> String {
    let mut preview: String = content.chars().take(QUERY_PREVIEW_LEN).collect();
    if content.chars().count() > QUERY_PREVIEW_LEN {
        preview.push_str("...");
    }
    preview
}
