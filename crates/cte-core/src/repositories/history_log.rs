use std::sync::Arc;

use tracing::warn;

use super::error::RepositoryResult;
use super::kv::{HISTORY_KEY, KeyValueStore};
use crate::models::history::HistoryEntry;

/// The persisted history collection, most recent entry first.
///
/// The in-memory vector is authoritative for the running session: every
/// mutation applies in memory first and then persists the whole collection.
/// A persistence failure is reported to the caller but never rolls the
/// in-memory mutation back — losing durability is acceptable, losing the
/// live data is not.
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    store: Arc<dyn KeyValueStore>,
}

impl HistoryLog {
    /// Load the collection from the store. A missing key or an unparseable
    /// payload both read as an empty collection; entries that do not hold
    /// the two-message turn pair (a hand-edited file can produce them) are
    /// dropped individually.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match store.get(HISTORY_KEY).await {
            Ok(Some(value)) => match serde_json::from_value::<Vec<HistoryEntry>>(value) {
                Ok(entries) => entries
                    .into_iter()
                    .filter(|entry| {
                        if entry.messages.len() == 2 {
                            true
                        } else {
                            warn!(
                                id = %entry.id,
                                messages = entry.messages.len(),
                                "History entry is not a question/answer pair, dropping"
                            );
                            false
                        }
                    })
                    .collect(),
                Err(e) => {
                    warn!(error = %e, "History store is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "History store unreadable, starting empty");
                Vec::new()
            }
        };
        Self { entries, store }
    }

    /// Entries in persisted order (most recent first).
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Archive a new entry at the head of the collection.
    pub async fn prepend(&mut self, entry: HistoryEntry) -> RepositoryResult<()> {
        self.entries.insert(0, entry);
        self.persist().await
    }

    /// Delete an entry by id. Returns whether anything was removed.
    pub async fn delete(&mut self, id: &str) -> RepositoryResult<bool> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    async fn persist(&self) -> RepositoryResult<()> {
        let value = serde_json::to_value(&self.entries)?;
        self.store.set(HISTORY_KEY, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::context::CteContext;
    use crate::models::message::Message;
    use crate::repositories::in_memory_store::InMemoryStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::Level;
    use tracing::instrument::WithSubscriber;
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::SubscriberExt;

    /// Layer that counts warn-level events, to pin down which load paths
    /// report problems.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn entry(id: &str, ts: i64) -> HistoryEntry {
        HistoryEntry::new(
            id.to_string(),
            ts,
            CteContext::General,
            Message::user(ts, "consulta", None),
            Message::model_notice(ts + 1, "respuesta"),
            None,
        )
    }

    #[tokio::test]
    async fn test_missing_key_loads_empty() {
        let log = HistoryLog::load(Arc::new(InMemoryStore::new())).await;
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_payload_warns_and_loads_empty() {
        let warns = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warns.clone()));

        let store = InMemoryStore::new();
        store.seed(HISTORY_KEY, json!("definitely not a history list"));

        let log = HistoryLog::load(Arc::new(store))
            .with_subscriber(subscriber)
            .await;
        assert!(log.is_empty());
        assert_eq!(warns.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_entries_without_a_turn_pair_are_dropped_on_load() {
        let good = entry("good", 100);
        let mut bad = entry("bad", 200);
        bad.messages.clear();

        let warns = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warns.clone()));

        let store = InMemoryStore::new();
        store.seed(
            HISTORY_KEY,
            serde_json::to_value(vec![bad, good]).unwrap(),
        );

        let log = HistoryLog::load(Arc::new(store))
            .with_subscriber(subscriber)
            .await;
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].id, "good");
        // The surviving entry still answers the pair accessors.
        assert_eq!(log.get("good").unwrap().user_message().content, "consulta");
        assert_eq!(warns.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_prepend_keeps_most_recent_first_and_persists() {
        let store = Arc::new(InMemoryStore::new());
        let mut log = HistoryLog::load(store.clone()).await;

        log.prepend(entry("a", 100)).await.unwrap();
        log.prepend(entry("b", 200)).await.unwrap();

        assert_eq!(log.entries()[0].id, "b");
        assert_eq!(log.entries()[1].id, "a");

        // A fresh load sees the same order.
        let reloaded = HistoryLog::load(store).await;
        assert_eq!(reloaded.entries()[0].id, "b");
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_in_memory_entry() {
        let store = InMemoryStore::new();
        let mut log = HistoryLog::load(Arc::new(store.clone())).await;

        store.set_fail_writes(true);
        assert!(log.prepend(entry("a", 100)).await.is_err());

        // The live session still has the entry.
        assert_eq!(log.len(), 1);
        assert!(log.get("a").is_some());
    }

    #[tokio::test]
    async fn test_delete_removes_and_reports() {
        let store = Arc::new(InMemoryStore::new());
        let mut log = HistoryLog::load(store).await;
        log.prepend(entry("a", 100)).await.unwrap();

        assert!(log.delete("a").await.unwrap());
        assert!(!log.delete("a").await.unwrap());
        assert!(log.is_empty());
    }
}
