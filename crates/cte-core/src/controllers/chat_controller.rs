use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::models::context::CteContext;
use crate::models::conversation::Conversation;
use crate::models::history::{HistoryEntry, Project};
use crate::models::loading::LoadingStatus;
use crate::models::message::{Attachment, Message, MessageId};
use crate::models::scroll::ScrollAnchor;
use crate::models::stream_reconciler::StreamReconciler;
use crate::repositories::history_log::HistoryLog;
use crate::repositories::kv::KeyValueStore;
use crate::repositories::project_registry::ProjectRegistry;
use crate::services::provider::{
    ChatProvider, ProviderConfig, ProviderError, ProviderRequest, StreamEvent,
};

/// Turns shorter than this are not worth archiving (aborted or trivial
/// replies). Measured in characters of finalized content.
const ARCHIVE_THRESHOLD: usize = 50;

/// What became of a `send` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Silently ignored: empty input, or another send already in flight.
    /// The message log is untouched.
    Rejected,
    /// Streamed to completion and finalized (archived when long enough).
    Completed,
    /// The provider failed; partial content was kept with an inline notice,
    /// and nothing was archived.
    Failed,
}

/// Owns the conversation, both persisted collections, and the provider
/// handle, and serializes every mutation through `&mut self` — the single
/// writer the storage model requires.
pub struct ChatController {
    conversation: Conversation,
    history: HistoryLog,
    projects: ProjectRegistry,
    provider: Arc<dyn ChatProvider>,
    config: ProviderConfig,
    scroll: ScrollAnchor,
    loading: LoadingStatus,
    in_flight: bool,
}

impl ChatController {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        config: ProviderConfig,
        history: HistoryLog,
        projects: ProjectRegistry,
    ) -> Self {
        Self {
            conversation: Conversation::new(),
            history,
            projects,
            provider,
            config,
            scroll: ScrollAnchor::new(),
            loading: LoadingStatus::new(),
            in_flight: false,
        }
    }

    /// Load both collections from a store and build a controller around them.
    pub async fn open(
        provider: Arc<dyn ChatProvider>,
        config: ProviderConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let history = HistoryLog::load(store.clone()).await;
        let projects = ProjectRegistry::load(store).await;
        Self::new(provider, config, history, projects)
    }

    // --- conversation surface -------------------------------------------

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight
    }

    /// Switch the regulatory context. The transcript is kept; a notice
    /// message announces the switch, and the view re-anchors to the bottom.
    pub fn set_context(&mut self, context: CteContext) {
        self.conversation.set_context(context);
        self.scroll.force_bottom();
    }

    pub fn clear_visible(&mut self) {
        self.conversation.clear_visible();
    }

    /// Replace the transcript with an archived turn.
    pub fn load_history_entry(&mut self, entry_id: &str) -> bool {
        let Some(entry) = self.history.get(entry_id).cloned() else {
            return false;
        };
        self.conversation.load_from_history(&entry);
        true
    }

    // --- projects --------------------------------------------------------

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn projects(&self) -> &ProjectRegistry {
        &self.projects
    }

    /// The active project, resolved at read time: an id pointing at a
    /// deleted project reads as "no active project".
    pub fn active_project(&self) -> Option<&Project> {
        self.conversation
            .active_project_id()
            .and_then(|id| self.projects.get(id))
    }

    pub fn activate_project(&mut self, project_id: Option<String>) {
        self.conversation.set_active_project(project_id);
    }

    /// Create a project and make it active.
    pub async fn create_project(
        &mut self,
        name: impl Into<String>,
    ) -> crate::repositories::RepositoryResult<Project> {
        let project = self.projects.create(name).await?;
        self.conversation.set_active_project(Some(project.id.clone()));
        Ok(project)
    }

    /// Delete a project. Its history entries keep their (now dangling)
    /// reference; the active pointer is cleared when it named this project.
    pub async fn delete_project(
        &mut self,
        project_id: &str,
    ) -> crate::repositories::RepositoryResult<bool> {
        let removed = self.projects.delete(project_id).await?;
        if self.conversation.active_project_id() == Some(project_id) {
            self.conversation.set_active_project(None);
        }
        Ok(removed)
    }

    pub async fn delete_history_entry(
        &mut self,
        entry_id: &str,
    ) -> crate::repositories::RepositoryResult<bool> {
        self.history.delete(entry_id).await
    }

    // --- viewport --------------------------------------------------------

    pub fn observe_scroll(&mut self, scroll_top: f32, scroll_height: f32, viewport_height: f32) {
        self.scroll.observe(scroll_top, scroll_height, viewport_height);
    }

    pub fn should_autoscroll(&self) -> bool {
        self.scroll.should_autoscroll()
    }

    pub fn loading_text(&self) -> &'static str {
        self.loading.current()
    }

    // --- the send path ---------------------------------------------------

    /// Send a prompt (and optional attachment) to the provider, streaming
    /// the reply into the transcript.
    ///
    /// Empty input and sends during an in-flight turn are rejected as
    /// silent no-ops. Context, project, and bounded recent history are
    /// snapshotted up front, so switching either mid-stream does not alter
    /// the in-flight call or its archive record.
    pub async fn send(&mut self, text: &str, attachment: Option<Attachment>) -> SendOutcome {
        if text.trim().is_empty() && attachment.is_none() {
            return SendOutcome::Rejected;
        }
        if self.in_flight {
            debug!("Send rejected: another send is in flight");
            return SendOutcome::Rejected;
        }

        self.in_flight = true;
        self.loading.start();
        let outcome = self.run_turn(text, attachment).await;
        self.loading.stop();
        self.in_flight = false;
        outcome
    }

    async fn run_turn(&mut self, text: &str, attachment: Option<Attachment>) -> SendOutcome {
        // Snapshots: an in-flight turn must not see later switches.
        let context = self.conversation.context();
        let project_id = self.active_project().map(|p| p.id.clone());
        // Captured before the user message lands, so the prompt itself is
        // not duplicated into the history payload.
        let recent = self.conversation.recent(self.config.history_limit);

        let user_id = self.conversation.next_message_id();
        let user_message = Message::user(user_id, text, attachment.clone());
        self.conversation.push_message(user_message.clone());
        self.scroll.force_bottom();

        let model_id = self.conversation.next_message_id();
        self.conversation
            .push_message(Message::streaming_placeholder(model_id));

        let request = ProviderRequest {
            prompt: text.to_string(),
            attachment,
            context,
            history: recent,
            system_instruction: self.config.system_instruction(context),
        };

        let mut reconciler = StreamReconciler::new();

        let provider = self.provider.clone();
        let mut stream = match provider.stream(request).await {
            Ok(stream) => stream,
            Err(e) => {
                self.fail_turn(model_id, reconciler, &e);
                return SendOutcome::Failed;
            }
        };

        while let Some(event) = stream.next().await {
            match event {
                Ok(StreamEvent::Text(chunk)) => {
                    if let Some(full_text) = reconciler.push_text(&chunk) {
                        self.conversation.apply_streamed_text(model_id, full_text);
                    }
                }
                Ok(StreamEvent::Citations(chunks)) => {
                    let citations = reconciler.push_citations(chunks);
                    self.conversation.apply_citations(model_id, citations);
                }
                Err(e) => {
                    self.fail_turn(model_id, reconciler, &e);
                    return SendOutcome::Failed;
                }
            }
        }

        // Finalize from the accumulator: the last increments may never have
        // cleared the throttle window.
        let (final_text, citations) = reconciler.finalize();
        self.conversation
            .finalize_message(model_id, final_text.clone(), citations);

        if final_text.chars().count() > ARCHIVE_THRESHOLD {
            self.archive_turn(model_id, user_message, context, project_id)
                .await;
        }

        SendOutcome::Completed
    }

    /// Failure path: keep whatever streamed, append the classified notice,
    /// freeze the message. Failed turns are never archived.
    fn fail_turn(&mut self, model_id: MessageId, reconciler: StreamReconciler, error: &ProviderError) {
        warn!(error = %error, "Provider call failed mid-turn");
        let (partial, citations) = reconciler.finalize();
        let content = format!("{partial}{}", error.user_notice());
        self.conversation.finalize_message(model_id, content, citations);
    }

    async fn archive_turn(
        &mut self,
        model_id: MessageId,
        user_message: Message,
        context: CteContext,
        project_id: Option<String>,
    ) {
        let Some(model_message) = self.conversation.message(model_id).cloned() else {
            return;
        };

        let timestamp = Utc::now().timestamp_millis();
        let entry = HistoryEntry::new(
            model_id.to_string(),
            timestamp,
            context,
            user_message,
            model_message,
            project_id,
        );

        // A broken store must not break the conversation: the in-memory
        // transcript stays authoritative even when durability is lost.
        if let Err(e) = self.history.prepend(entry).await {
            warn!(error = %e, "Failed to persist history entry");
        }
    }
}
