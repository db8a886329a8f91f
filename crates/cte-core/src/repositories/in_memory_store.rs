use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::error::{RepositoryError, RepositoryResult};
use super::kv::{BoxFuture, KeyValueStore};

/// In-memory key-value store for tests and ephemeral sessions.
///
/// Writes can be made to fail on demand, which is how the
/// persistence-failure paths (archive on a broken store) get exercised.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    values: Arc<Mutex<HashMap<String, serde_json::Value>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail until turned off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Seed a raw value directly, bypassing `set` (used to plant corrupt
    /// payloads in tests).
    pub fn seed(&self, key: &str, value: serde_json::Value) {
        self.values.lock().insert(key.to_string(), value);
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> BoxFuture<'static, RepositoryResult<Option<serde_json::Value>>> {
        let values = self.values.clone();
        let key = key.to_string();

        Box::pin(async move { Ok(values.lock().get(&key).cloned()) })
    }

    fn set(&self, key: &str, value: serde_json::Value) -> BoxFuture<'static, RepositoryResult<()>> {
        let values = self.values.clone();
        let fail = self.fail_writes.load(Ordering::Relaxed);
        let key = key.to_string();

        Box::pin(async move {
            if fail {
                return Err(RepositoryError::WriteFailed {
                    message: format!("write to '{key}' rejected by test switch"),
                });
            }
            values.lock().insert(key, value);
            Ok(())
        })
    }
}
