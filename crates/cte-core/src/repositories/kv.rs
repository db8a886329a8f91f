use std::future::Future;
use std::pin::Pin;

use super::error::RepositoryResult;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Key under which the history collection is persisted.
pub const HISTORY_KEY: &str = "cte_history_v1";

/// Key under which the projects collection is persisted.
pub const PROJECTS_KEY: &str = "cte_projects_v1";

/// Generic JSON key-value store behind the persisted collections.
///
/// Implementations must tolerate a missing key (`Ok(None)`); callers
/// tolerate a corrupt value by treating it as an empty collection. Neither
/// case is ever allowed to take down the conversation flow.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Load the JSON blob stored under `key`, if any.
    fn get(&self, key: &str) -> BoxFuture<'static, RepositoryResult<Option<serde_json::Value>>>;

    /// Store a JSON blob under `key`, replacing any previous value.
    fn set(&self, key: &str, value: serde_json::Value) -> BoxFuture<'static, RepositoryResult<()>>;
}
