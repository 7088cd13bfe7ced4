//! Enrichment Orchestrator and UI state container.
//!
//! [`TodoApp`] owns the task list, the view mode, the input buffer and the
//! "analyzing" gate. Every user action is a method that performs at most one
//! store round-trip and then applies the matching [`ListState`] update.
//!
//! Locks on the state are only taken between awaits, never across them, so a
//! slow analysis does not block toggles or deletes on other records.

use crate::analysis::TaskAnalyzer;
use crate::error::{Result, StoreError, TodoError};
use crate::models::{NewTaskRecord, TaskRecord, TaskStats};
use crate::state::ListState;
use crate::store::{classify_fetch_error, TaskStore};
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Message shown when a task could not be created
pub const ADD_FAILED_MESSAGE: &str =
    "Something went wrong while analyzing the task. Please try again.";

/// What the front-end should render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewMode {
    Loading,
    Ready,
    /// The backing table is missing; blocks normal operation until a successful fetch
    SetupRequired {
        code: Option<String>,
        message: String,
    },
    /// The last fetch failed; the previous list is left untouched
    FetchFailed { message: String },
}

/// Progress of the last task submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Submission {
    #[default]
    Idle,
    /// Input cleared, analysis and insert in flight
    Pending { title: String },
    Committed { id: String },
    /// The title is kept here but not restored to the input
    Failed { title: String, message: String },
}

#[derive(Debug)]
struct AppState {
    list: ListState,
    mode: ViewMode,
    input: String,
    submission: Submission,
    error: Option<String>,
}

/// Serializable view of the whole state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub mode: ViewMode,
    pub tasks: Vec<TaskRecord>,
    pub stats: TaskStats,
    pub analyzing: bool,
    pub input: String,
    pub submission: Submission,
    pub error: Option<String>,
}

/// Held for the duration of one add. Resets the analyzing flag when the add
/// ends, however it ends; an add abandoned while `Pending` goes back to `Idle`.
struct AnalyzingGuard<'a> {
    flag: &'a AtomicBool,
    state: &'a RwLock<AppState>,
}

impl Drop for AnalyzingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if matches!(state.submission, Submission::Pending { .. }) {
            tracing::warn!("Task submission abandoned before it completed");
            state.submission = Submission::Idle;
        }
        drop(state);
        self.flag.store(false, Ordering::Release);
    }
}

pub struct TodoApp<S, A> {
    store: S,
    analyzer: A,
    state: RwLock<AppState>,
    analyzing: AtomicBool,
}

impl<S: TaskStore, A: TaskAnalyzer> TodoApp<S, A> {
    /// Starts in `Loading`; call [`fetch`](Self::fetch) to populate
    pub fn new(store: S, analyzer: A) -> Self {
        Self {
            store,
            analyzer,
            state: RwLock::new(AppState {
                list: ListState::default(),
                mode: ViewMode::Loading,
                input: String::new(),
                submission: Submission::Idle,
                error: None,
            }),
            analyzing: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing.load(Ordering::Acquire)
    }

    pub fn mode(&self) -> ViewMode {
        self.read().mode.clone()
    }

    pub fn tasks(&self) -> Vec<TaskRecord> {
        self.read().list.tasks().to_vec()
    }

    pub fn stats(&self) -> TaskStats {
        self.read().list.stats()
    }

    pub fn input(&self) -> String {
        self.read().input.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn submission(&self) -> Submission {
        self.read().submission.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.read();
        Snapshot {
            mode: state.mode.clone(),
            tasks: state.list.tasks().to_vec(),
            stats: state.list.stats(),
            analyzing: self.is_analyzing(),
            input: state.input.clone(),
            submission: state.submission.clone(),
            error: state.error.clone(),
        }
    }

    /// Update the input buffer. Rejected while an analysis is running.
    pub fn set_input(&self, text: impl Into<String>) -> Result<()> {
        if self.is_analyzing() {
            return Err(TodoError::AnalysisInProgress);
        }
        self.write().input = text.into();
        Ok(())
    }

    /// Fetch every task from the store and overwrite the list.
    ///
    /// On failure the list is left as it was. A relation-missing failure
    /// switches to [`ViewMode::SetupRequired`]; a later successful fetch
    /// leaves it.
    pub async fn fetch(&self) -> Result<()> {
        {
            let mut state = self.write();
            state.mode = ViewMode::Loading;
            state.error = None;
        }

        match self.store.list_all().await {
            Ok(records) => {
                tracing::info!(count = records.len(), "Tasks loaded");
                let mut state = self.write();
                state.list.replace_all(records);
                state.mode = ViewMode::Ready;
                Ok(())
            },
            Err(e) => {
                let err = classify_fetch_error(e, &self.store.qualified_table());
                tracing::error!(error = %err, "Error fetching tasks");
                let mut state = self.write();
                match &err {
                    TodoError::SetupRequired(store_err) => {
                        state.mode = ViewMode::SetupRequired {
                            code: store_err.code.clone(),
                            message: store_err.message.clone(),
                        };
                        state.error = Some(store_err.message.clone());
                    },
                    other => {
                        let message = match other {
                            TodoError::FetchFailed(msg) => msg.clone(),
                            _ => other.to_string(),
                        };
                        state.mode = ViewMode::FetchFailed {
                            message: message.clone(),
                        };
                        state.error = Some(message);
                    },
                }
                Err(err)
            },
        }
    }

    /// Submit whatever is in the input buffer.
    ///
    /// Blank input, setup mode or a running analysis leave the buffer
    /// untouched; otherwise the buffer is cleared before the task is analyzed
    /// and stored.
    pub async fn submit(&self) -> Result<TaskRecord> {
        if self.read().input.trim().is_empty() {
            return Err(TodoError::InvalidInput("Task title is empty".to_string()));
        }
        let guard = self.begin_add()?;

        let title = {
            let mut state = self.write();
            let title = state.input.trim().to_string();
            if title.is_empty() {
                return Err(TodoError::InvalidInput("Task title is empty".to_string()));
            }
            state.input.clear();
            title
        };
        self.run_add(&title, guard).await
    }

    /// Analyze `title`, persist the enriched record, and prepend the stored row.
    ///
    /// Blank titles are rejected before any network call. Only one add may be
    /// in flight; a second one is rejected with [`TodoError::AnalysisInProgress`].
    pub async fn add_task(&self, title: &str) -> Result<TaskRecord> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TodoError::InvalidInput("Task title is empty".to_string()));
        }
        let guard = self.begin_add()?;

        self.write().input.clear();
        self.run_add(title, guard).await
    }

    /// Take the analyzing gate, refusing in setup mode or while another add runs
    fn begin_add(&self) -> Result<AnalyzingGuard<'_>> {
        self.ensure_provisioned()?;

        if self
            .analyzing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TodoError::AnalysisInProgress);
        }
        Ok(AnalyzingGuard {
            flag: &self.analyzing,
            state: &self.state,
        })
    }

    async fn run_add(&self, title: &str, _guard: AnalyzingGuard<'_>) -> Result<TaskRecord> {
        {
            let mut state = self.write();
            state.error = None;
            state.submission = Submission::Pending {
                title: title.to_string(),
            };
        }

        match self.enrich_and_insert(title).await {
            Ok(record) => {
                tracing::info!(
                    id = %record.id,
                    priority = %record.priority,
                    sub_tasks = record.sub_tasks.len(),
                    "Task added"
                );
                let mut state = self.write();
                state.list.add(record.clone());
                state.submission = Submission::Committed {
                    id: record.id.clone(),
                };
                Ok(record)
            },
            Err(e) => {
                tracing::error!(error = %e, title, "Error adding task");
                let mut state = self.write();
                state.error = Some(ADD_FAILED_MESSAGE.to_string());
                state.submission = Submission::Failed {
                    title: title.to_string(),
                    message: e.to_string(),
                };
                Err(TodoError::AddFailed(e.to_string()))
            },
        }
    }

    async fn enrich_and_insert(&self, title: &str) -> Result<TaskRecord> {
        let analysis = self.analyzer.analyze(title).await?;
        tracing::debug!(reasoning = %analysis.reasoning, "Analysis complete");

        let candidate = NewTaskRecord::from_analysis(title, &analysis, Utc::now());
        self.store.insert(&candidate).await
    }

    /// Flip the completion flag of `id`
    pub async fn toggle(&self, id: &str) -> Result<bool> {
        let current = self
            .read()
            .list
            .get(id)
            .map(|t| t.is_completed)
            .ok_or_else(|| TodoError::TaskNotFound(id.to_string()))?;
        let target = !current;
        self.set_completion(id, target).await?;
        Ok(target)
    }

    /// Write `is_completed` for `id`, then apply it locally.
    /// Failures are logged and leave the list unchanged.
    pub async fn set_completion(&self, id: &str, is_completed: bool) -> Result<()> {
        self.ensure_provisioned()?;
        if let Err(e) = self.store.update_completion(id, is_completed).await {
            tracing::error!(error = %e, id, "Error updating task");
            return Err(TodoError::MutationFailed(e.to_string()));
        }

        if !self.write().list.toggle(id, is_completed) {
            tracing::debug!(id, "Updated task is not in the local list");
        }
        Ok(())
    }

    /// Delete one task. Deleting an id that is already gone succeeds.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.ensure_provisioned()?;
        if let Err(e) = self.store.delete_by_id(id).await {
            tracing::error!(error = %e, id, "Error deleting task");
            return Err(TodoError::MutationFailed(e.to_string()));
        }

        self.write().list.remove(id);
        tracing::info!(id, "Task deleted");
        Ok(())
    }

    /// Delete every completed task in one request. Returns how many were removed.
    ///
    /// Makes no request when nothing is completed.
    pub async fn clear_completed(&self) -> Result<usize> {
        self.ensure_provisioned()?;
        let ids = self.read().list.completed_ids();
        if ids.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.store.delete_by_ids(&ids).await {
            tracing::error!(error = %e, count = ids.len(), "Error clearing completed tasks");
            return Err(TodoError::MutationFailed(e.to_string()));
        }

        self.write().list.remove_many(&ids);
        tracing::info!(count = ids.len(), "Completed tasks cleared");
        Ok(ids.len())
    }

    fn ensure_provisioned(&self) -> Result<()> {
        match &self.read().mode {
            ViewMode::SetupRequired { code, message } => Err(TodoError::SetupRequired(
                StoreError::new(code.as_deref(), message.clone()),
            )),
            _ => Ok(()),
        }
    }
}
