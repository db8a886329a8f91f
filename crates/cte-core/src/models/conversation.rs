use tracing::debug;

use super::context::CteContext;
use super::history::HistoryEntry;
use super::message::{Citation, Message, MessageId, MessageIdAllocator};

/// The visible conversation: an ordered message log plus the active
/// regulatory context and project association.
///
/// Only the chat controller mutates a streaming message; everything else
/// sees messages as frozen once `is_streaming` is false. The log lives in
/// memory only — durability is the history log's job, one entry per
/// archived turn.
pub struct Conversation {
    messages: Vec<Message>,
    context: CteContext,
    /// Weak reference: may name a project that has since been deleted.
    /// Resolved against the project registry at read time.
    active_project_id: Option<String>,
    ids: MessageIdAllocator,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            context: CteContext::default(),
            active_project_id: None,
            ids: MessageIdAllocator::new(),
        }
    }

    pub fn context(&self) -> CteContext {
        self.context
    }

    /// Switch the active regulatory context. Unchanged context is a no-op;
    /// otherwise a notice message announces the switch. The existing log is
    /// kept — switching context never destroys the transcript.
    pub fn set_context(&mut self, context: CteContext) {
        if self.context == context {
            return;
        }
        self.context = context;
        let id = self.ids.next();
        self.messages.push(Message::model_notice(
            id,
            format!(
                "🔔 **Modo Experto Activado: {context}**\n\nHe cargado las instrucciones \
                 específicas y la base de conocimiento para *{context}*."
            ),
        ));
        debug!(context = %context, "Switched regulatory context");
    }

    pub fn active_project_id(&self) -> Option<&str> {
        self.active_project_id.as_deref()
    }

    pub fn set_active_project(&mut self, project_id: Option<String>) {
        self.active_project_id = project_id;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// The last `n` messages, cloned, for a bounded provider payload.
    pub fn recent(&self, n: usize) -> Vec<Message> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..].to_vec()
    }

    /// Empty the visible log. Persisted history is untouched.
    pub fn clear_visible(&mut self) {
        self.messages.clear();
    }

    /// Replace the visible log with an archived turn. Adopts the entry's
    /// project when it has one; an untagged entry leaves the currently
    /// active project alone.
    pub fn load_from_history(&mut self, entry: &HistoryEntry) {
        self.messages = entry.messages.clone();
        self.context = entry.context;
        if let Some(project_id) = &entry.project_id {
            self.active_project_id = Some(project_id.clone());
        }
        debug!(entry_id = %entry.id, context = %entry.context, "Loaded history entry");
    }

    pub fn next_message_id(&mut self) -> MessageId {
        self.ids.next()
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    fn message_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    /// Overwrite a streaming message's visible content with the reconciler's
    /// full accumulated text.
    pub fn apply_streamed_text(&mut self, id: MessageId, full_text: String) {
        if let Some(msg) = self.message_mut(id)
            && msg.is_streaming
        {
            msg.content = full_text;
        }
    }

    /// Replace a streaming message's citation list (citations bypass the
    /// throttle and show immediately).
    pub fn apply_citations(&mut self, id: MessageId, citations: Vec<Citation>) {
        if let Some(msg) = self.message_mut(id)
            && msg.is_streaming
        {
            msg.citations = citations;
        }
    }

    /// Freeze a streaming message with its final content and citations.
    /// After this the message is never mutated again.
    pub fn finalize_message(&mut self, id: MessageId, content: String, citations: Vec<Citation>) {
        if let Some(msg) = self.message_mut(id) {
            msg.content = content;
            msg.citations = citations;
            msg.is_streaming = false;
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archived_entry(project_id: Option<&str>) -> HistoryEntry {
        HistoryEntry::new(
            "e1".to_string(),
            1_700_000_000_000,
            CteContext::DbSeAe,
            Message::user(1, "Calcula la carga de nieve en Burgos", None),
            Message::model_notice(2, "qn = 1,0 kN/m²"),
            project_id.map(|p| p.to_string()),
        )
    }

    #[test]
    fn test_set_context_appends_notice_and_keeps_log() {
        let mut conv = Conversation::new();
        let id = conv.next_message_id();
        conv.push_message(Message::user(id, "hola", None));

        conv.set_context(CteContext::DbSi);

        assert_eq!(conv.context(), CteContext::DbSi);
        assert_eq!(conv.message_count(), 2);
        let notice = &conv.messages()[1];
        assert_eq!(notice.role, crate::models::message::Role::Model);
        assert!(notice.content.contains("DB-SI"));
    }

    #[test]
    fn test_set_same_context_is_noop() {
        let mut conv = Conversation::new();
        conv.set_context(CteContext::General);
        assert_eq!(conv.message_count(), 0);
    }

    #[test]
    fn test_clear_visible_empties_log_only() {
        let mut conv = Conversation::new();
        conv.set_context(CteContext::DbHe);
        conv.clear_visible();
        assert_eq!(conv.message_count(), 0);
        // Context survives the clear.
        assert_eq!(conv.context(), CteContext::DbHe);
    }

    #[test]
    fn test_load_from_history_adopts_project() {
        let mut conv = Conversation::new();
        conv.load_from_history(&archived_entry(Some("p7")));

        assert_eq!(conv.message_count(), 2);
        assert_eq!(conv.context(), CteContext::DbSeAe);
        assert_eq!(conv.active_project_id(), Some("p7"));
    }

    #[test]
    fn test_load_untagged_entry_keeps_active_project() {
        let mut conv = Conversation::new();
        conv.set_active_project(Some("p1".to_string()));
        conv.load_from_history(&archived_entry(None));
        assert_eq!(conv.active_project_id(), Some("p1"));
    }

    #[test]
    fn test_recent_bounds_history() {
        let mut conv = Conversation::new();
        for i in 0..10 {
            let id = conv.next_message_id();
            conv.push_message(Message::user(id, format!("m{i}"), None));
        }
        let recent = conv.recent(6);
        assert_eq!(recent.len(), 6);
        assert_eq!(recent[0].content, "m4");
        assert_eq!(recent[5].content, "m9");

        assert_eq!(conv.recent(50).len(), 10);
    }

    #[test]
    fn test_finalized_message_rejects_further_streaming_updates() {
        let mut conv = Conversation::new();
        let id = conv.next_message_id();
        conv.push_message(Message::streaming_placeholder(id));

        conv.apply_streamed_text(id, "parcial".to_string());
        conv.finalize_message(id, "final".to_string(), Vec::new());
        conv.apply_streamed_text(id, "tarde".to_string());
        conv.apply_citations(
            id,
            vec![Citation {
                source_uri: "x".to_string(),
                title: "x".to_string(),
            }],
        );

        let msg = conv.message(id).unwrap();
        assert_eq!(msg.content, "final");
        assert!(!msg.is_streaming);
        assert!(msg.citations.is_empty());
    }
}
