use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::error::RepositoryResult;
use super::kv::{KeyValueStore, PROJECTS_KEY};
use crate::models::history::Project;

/// The persisted projects collection, most recently created first.
///
/// Same durability stance as the history log: in-memory state is
/// authoritative, persistence failures are reported but never undo a
/// mutation.
pub struct ProjectRegistry {
    projects: Vec<Project>,
    store: Arc<dyn KeyValueStore>,
    last_id: i64,
}

impl ProjectRegistry {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let projects: Vec<Project> = match store.get(PROJECTS_KEY).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(projects) => projects,
                Err(e) => {
                    warn!(error = %e, "Projects store is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Projects store unreadable, starting empty");
                Vec::new()
            }
        };
        Self { projects, store, last_id: 0 }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Create a project and place it at the head of the collection. The id
    /// is the creation timestamp in milliseconds, bumped on collision so
    /// two rapid creations stay distinct.
    pub async fn create(&mut self, name: impl Into<String>) -> RepositoryResult<Project> {
        let now = Utc::now().timestamp_millis();
        self.last_id = if now > self.last_id { now } else { self.last_id + 1 };

        let project = Project {
            id: self.last_id.to_string(),
            name: name.into(),
            created_at: now,
        };
        self.projects.insert(0, project.clone());
        self.persist().await?;
        Ok(project)
    }

    /// Delete a project by id. History entries tagged with it are left
    /// alone; their reference simply dangles and resolves to "no project".
    pub async fn delete(&mut self, id: &str) -> RepositoryResult<bool> {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    async fn persist(&self) -> RepositoryResult<()> {
        let value = serde_json::to_value(&self.projects)?;
        self.store.set(PROJECTS_KEY, value).await
    }
}
