//! List State Reconciler.
//!
//! The client-visible task list and the pure update functions each mutation
//! applies after the store confirms it. Counts are computed from the list on
//! demand and never stored.

use crate::models::{TaskRecord, TaskStats};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ListState {
    tasks: Vec<TaskRecord>,
}

impl ListState {
    pub fn new(tasks: Vec<TaskRecord>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Overwrite with a freshly fetched list (already newest first)
    pub fn replace_all(&mut self, tasks: Vec<TaskRecord>) {
        self.tasks = tasks;
    }

    /// Prepend a newly created record
    pub fn add(&mut self, record: TaskRecord) {
        self.tasks.insert(0, record);
    }

    /// Set `is_completed` on the matching record in place.
    /// Returns false when no record has `id`.
    pub fn toggle(&mut self, id: &str, is_completed: bool) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.is_completed = is_completed;
                true
            },
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.tasks.retain(|t| t.id != id);
    }

    /// Remove every record whose id is in `ids`, in one pass
    pub fn remove_many(&mut self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        self.tasks.retain(|t| !ids.contains(&t.id));
    }

    pub fn completed_ids(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| t.is_completed)
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn stats(&self) -> TaskStats {
        let completed = self.tasks.iter().filter(|t| t.is_completed).count();
        TaskStats {
            total: self.tasks.len(),
            pending: self.tasks.len() - completed,
            completed,
        }
    }
}
