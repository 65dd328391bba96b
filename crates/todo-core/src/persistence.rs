use std::collections::HashSet;

use tracing::{debug, error, warn};

use crate::error::{TodoError, TodoResult};
use crate::storage::KeyValueStore;
use crate::task::{Task, normalize_text};

/// Key the whole collection lives under.
pub const STORAGE_KEY: &str = "todo_tasks_v1";

/// Moves snapshots of the task collection in and out of a key-value store.
/// Each save overwrites the key with the full collection.
#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STORAGE_KEY)
    }

    pub fn with_key(store: S, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[tracing::instrument(skip(self, tasks), fields(key = %self.key, count = tasks.len()))]
    pub fn save(&mut self, tasks: &[Task]) -> TodoResult<()> {
        let result = encode(tasks).and_then(|raw| {
            self.store
                .set(&self.key, &raw)
                .map_err(TodoError::from)
        });
        match &result {
            Ok(()) => debug!("saved tasks"),
            Err(err) => error!(error = %err, "save error"),
        }
        result
    }

    /// Reads the collection. A missing or empty value is an empty collection.
    /// A value that does not decode is deleted and reported as
    /// [`TodoError::CorruptState`].
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub fn load(&mut self) -> TodoResult<Vec<Task>> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                debug!("no stored tasks");
                return Ok(Vec::new());
            }
            Err(err) => {
                error!(error = %err, "load error");
                return Err(TodoError::Unreadable(err.to_string()));
            }
        };

        match decode(&raw) {
            Ok(tasks) => {
                debug!(count = tasks.len(), "loaded tasks");
                Ok(tasks)
            }
            Err(err) => {
                warn!(error = %err, "discarding corrupt task data");
                if let Err(remove_err) = self.store.remove(&self.key) {
                    error!(error = %remove_err, "failed to remove corrupt task data");
                }
                Err(err)
            }
        }
    }
}

pub fn encode(tasks: &[Task]) -> TodoResult<String> {
    Ok(serde_json::to_string(tasks)?)
}

/// Parses a stored blob, enforcing the collection invariants: trimmed,
/// non-blank text and unique identifiers. Padded text is trimmed in place.
pub fn decode(raw: &str) -> TodoResult<Vec<Task>> {
    let mut tasks: Vec<Task> =
        serde_json::from_str(raw).map_err(|err| TodoError::CorruptState(err.to_string()))?;

    for (idx, task) in tasks.iter_mut().enumerate() {
        match normalize_text(&task.text) {
            Some(text) => task.text = text,
            None => {
                return Err(TodoError::CorruptState(format!(
                    "task {idx} has empty text"
                )));
            }
        }
    }

    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if !seen.insert(task.id.as_str()) {
            return Err(TodoError::CorruptState(format!(
                "duplicate task id {}",
                task.id
            )));
        }
    }

    Ok(tasks)
}
