pub mod error;
pub mod history_log;
pub mod in_memory_store;
pub mod json_file_store;
pub mod kv;
pub mod project_registry;

pub use error::{RepositoryError, RepositoryResult};
pub use history_log::HistoryLog;
pub use in_memory_store::InMemoryStore;
pub use json_file_store::JsonFileStore;
pub use kv::{HISTORY_KEY, KeyValueStore, PROJECTS_KEY};
pub use project_registry::ProjectRegistry;
