use std::path::PathBuf;

use super::error::{RepositoryError, RepositoryResult};
use super::kv::{BoxFuture, KeyValueStore};

/// File-backed key-value store: one JSON file per key.
/// Defaults to ~/.config/cte-expert/ (platform equivalent via `dirs`).
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new() -> RepositoryResult<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| RepositoryError::InitializationError {
                message: "Could not determine config directory".to_string(),
            })?
            .join("cte-expert");
        Ok(Self { dir })
    }

    /// Store rooted at an explicit directory (tests, portable installs).
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> BoxFuture<'static, RepositoryResult<Option<serde_json::Value>>> {
        let path = self.key_path(key);

        Box::pin(async move {
            let contents = match tokio::fs::read_to_string(&path).await {
                Ok(contents) => contents,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            let value = serde_json::from_str(&contents)?;
            Ok(Some(value))
        })
    }

    fn set(&self, key: &str, value: serde_json::Value) -> BoxFuture<'static, RepositoryResult<()>> {
        let path = self.key_path(key);
        let dir = self.dir.clone();

        Box::pin(async move {
            tokio::fs::create_dir_all(&dir).await?;

            let json = serde_json::to_string_pretty(&value)?;

            // Write atomically (temp file, then rename) so a crash mid-write
            // never leaves a half-written collection behind.
            let temp_path = path.with_extension("json.tmp");
            tokio::fs::write(&temp_path, json).await?;
            tokio::fs::rename(&temp_path, &path).await?;

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::with_dir(dir.path().to_path_buf());

        let loaded = store.get("cte_history_v1").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::with_dir(dir.path().to_path_buf());

        let value = json!([{"id": "e1", "timestamp": 1000}]);
        store.set("cte_history_v1", value.clone()).await.unwrap();

        let loaded = store.get("cte_history_v1").await.unwrap();
        assert_eq!(loaded, Some(value));
    }

    #[tokio::test]
    async fn test_set_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::with_dir(dir.path().to_path_buf());

        store.set("k", json!(1)).await.unwrap();
        store.set("k", json!(2)).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::with_dir(dir.path().to_path_buf());

        store.set("k", json!({"a": 1})).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["k.json".to_string()]);
    }
}
