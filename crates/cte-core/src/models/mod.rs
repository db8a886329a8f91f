pub mod context;
pub mod conversation;
pub mod history;
pub mod history_index;
pub mod loading;
pub mod message;
pub mod scroll;
pub mod stream_reconciler;

pub use context::CteContext;
pub use conversation::Conversation;
pub use history::{HistoryEntry, Project};
pub use loading::LoadingStatus;
pub use message::{Attachment, Citation, Message, MessageId, Role};
pub use scroll::ScrollAnchor;
pub use stream_reconciler::StreamReconciler;
