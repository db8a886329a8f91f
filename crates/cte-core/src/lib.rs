//! Conversation engine for CTE Expert, an assistant for the Spanish
//! building code (Código Técnico de la Edificación).
//!
//! This crate is the UI-agnostic core: it owns the message log, the
//! streaming reconciliation of provider output, the archived history and
//! project collections, and the viewport/loading state a shell needs to
//! render a transcript. It deliberately owns no rendering, no document
//! catalog, and no network transport — a provider is injected behind the
//! [`services::ChatProvider`] trait.

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use controllers::{ChatController, SendOutcome};
pub use models::{
    Attachment, Citation, Conversation, CteContext, HistoryEntry, Message, Project, Role,
};
pub use repositories::{InMemoryStore, JsonFileStore, KeyValueStore};
pub use services::{ChatProvider, ProviderConfig, ProviderError, SimulatedProvider, StreamEvent};
