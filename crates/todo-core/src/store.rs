use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{TodoError, TodoResult};
use crate::persistence::Persistence;
use crate::storage::KeyValueStore;
use crate::task::{Task, TaskId, normalize_text};

/// Sole owner of the in-memory task collection, newest first. Every mutation
/// writes the full collection back through the persistence adapter. A failed
/// write does not roll the mutation back; it is parked in `save_error` until
/// the caller takes it.
#[derive(Debug)]
pub struct TaskStore<S> {
    tasks: Vec<Task>,
    persistence: Persistence<S>,
    save_error: Option<TodoError>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Wraps the adapter with an empty collection; call [`TaskStore::reload`]
    /// to pick up what is already stored.
    pub fn new(persistence: Persistence<S>) -> Self {
        Self {
            tasks: Vec::new(),
            persistence,
            save_error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.len() - self.remaining()
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut Persistence<S> {
        &mut self.persistence
    }

    /// Replaces the collection wholesale with what persistence holds. On error
    /// the collection is left empty.
    #[tracing::instrument(skip(self))]
    pub fn reload(&mut self) -> TodoResult<usize> {
        match self.persistence.load() {
            Ok(tasks) => {
                self.tasks = tasks;
                Ok(self.tasks.len())
            }
            Err(err) => {
                self.tasks.clear();
                Err(err)
            }
        }
    }

    pub fn take_save_error(&mut self) -> Option<TodoError> {
        self.save_error.take()
    }

    pub fn add(&mut self, text: &str) -> TodoResult<TaskId> {
        self.add_at(text, Utc::now())
    }

    #[tracing::instrument(skip(self, text))]
    pub fn add_at(&mut self, text: &str, now: DateTime<Utc>) -> TodoResult<TaskId> {
        let text = normalize_text(text).ok_or(TodoError::Validation)?;
        let task = Task::new(text, now);
        let id = task.id.clone();
        info!(id = %id, "adding task");
        self.tasks.insert(0, task);
        self.persist();
        Ok(id)
    }

    /// Flips the completion flag and returns its new value, or `None` when the
    /// id is unknown.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn toggle_complete(&mut self, id: &TaskId) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| &t.id == id)?;
        task.completed = !task.completed;
        let completed = task.completed;
        debug!(completed, "toggled task");
        self.persist();
        Some(completed)
    }

    /// Replaces a task's text. Returns `Ok(false)` when the id is unknown.
    #[tracing::instrument(skip(self, new_text), fields(id = %id))]
    pub fn edit(&mut self, id: &TaskId, new_text: &str) -> TodoResult<bool> {
        let text = normalize_text(new_text).ok_or(TodoError::Validation)?;
        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            debug!("edit target missing");
            return Ok(false);
        };
        task.text = text;
        self.persist();
        Ok(true)
    }

    /// Callers confirm with the user before calling; there is no undo.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn remove(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            info!("removed task");
            self.persist();
        }
        removed
    }

    #[tracing::instrument(skip(self))]
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        if removed > 0 {
            info!(removed, "cleared completed tasks");
            self.persist();
        }
        removed
    }

    #[tracing::instrument(skip(self))]
    pub fn clear_all(&mut self) -> usize {
        let removed = self.tasks.len();
        if removed > 0 {
            self.tasks.clear();
            info!(removed, "cleared all tasks");
            self.persist();
        }
        removed
    }

    fn persist(&mut self) {
        if let Err(err) = self.persistence.save(&self.tasks) {
            self.save_error = Some(err);
        }
    }
}
