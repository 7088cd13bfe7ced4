use super::{sort_newest_first, TaskStore};
use crate::config::{DEFAULT_SCHEMA, DEFAULT_TABLE};
use crate::error::{Result, StoreError, TodoError};
use crate::models::{NewTaskRecord, TaskRecord};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// In-process task table.
///
/// Counts every operation it receives and can be told to fail, so callers can
/// check both "no request issued" and failure paths.
#[derive(Default)]
pub struct MemoryTaskStore {
    rows: Mutex<Vec<TaskRecord>>,
    failure: Mutex<Option<StoreError>>,
    next_id: AtomicU64,
    requests: AtomicUsize,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<TaskRecord>) -> Self {
        let store = Self::new();
        *store.lock_rows() = records;
        store
    }

    /// A store whose table has not been provisioned yet
    pub fn missing_table() -> Self {
        let store = Self::new();
        store.fail_with(StoreError::new(
            Some(super::RELATION_MISSING_CODE),
            format!(
                "relation \"{}.{}\" does not exist",
                DEFAULT_SCHEMA, DEFAULT_TABLE
            ),
        ));
        store
    }

    /// Make every following operation fail with `err`
    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(err);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Number of operations received, failed ones included
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<TaskRecord> {
        self.lock_rows().clone()
    }

    fn lock_rows(&self) -> MutexGuard<'_, Vec<TaskRecord>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self) -> Result<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self
            .failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            Some(err) => Err(TodoError::Store(err)),
            None => Ok(()),
        }
    }
}

impl TaskStore for MemoryTaskStore {
    fn qualified_table(&self) -> String {
        format!("{}.{}", DEFAULT_SCHEMA, DEFAULT_TABLE)
    }

    async fn list_all(&self) -> Result<Vec<TaskRecord>> {
        self.begin()?;
        let mut records = self.lock_rows().clone();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn insert(&self, record: &NewTaskRecord) -> Result<TaskRecord> {
        self.begin()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = TaskRecord {
            id: format!("task-{}", id),
            title: record.title.clone(),
            is_completed: record.is_completed,
            priority: record.priority,
            sub_tasks: record.sub_tasks.clone(),
            created_at: record.created_at,
        };
        self.lock_rows().push(stored.clone());
        Ok(stored)
    }

    async fn update_completion(&self, id: &str, is_completed: bool) -> Result<()> {
        self.begin()?;
        if let Some(row) = self.lock_rows().iter_mut().find(|r| r.id == id) {
            row.is_completed = is_completed;
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        self.begin()?;
        self.lock_rows().retain(|r| r.id != id);
        Ok(())
    }

    async fn delete_by_ids(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.begin()?;
        self.lock_rows().retain(|r| !ids.contains(&r.id));
        Ok(())
    }
}
