//! Task Record Store: generic query operations over the remote `todos` table.
//!
//! [`TaskStore`] is the seam between the orchestrator and persistence.
//! [`RestTaskStore`] talks to a PostgREST (Supabase) endpoint; [`MemoryTaskStore`]
//! keeps rows in-process and is what the tests drive.

mod memory;
mod rest;

pub use memory::MemoryTaskStore;
pub use rest::RestTaskStore;

use std::future::Future;

use crate::error::{Result, StoreError, TodoError};
use crate::models::{NewTaskRecord, TaskRecord};

/// Postgres `undefined_table`
pub const RELATION_MISSING_CODE: &str = "42P01";

/// PostgREST's "table not in schema cache", raised for the same condition
pub const SCHEMA_CACHE_MISS_CODE: &str = "PGRST205";

/// Provisioning script for the backing table. Run once in the SQL editor.
pub const SETUP_SQL: &str = r#"create table todos (
  id uuid default gen_random_uuid() primary key,
  title text not null,
  is_completed boolean default false,
  priority text default 'medium' check (priority in ('low', 'medium', 'high')),
  created_at timestamptz default now(),
  sub_tasks text[]
);

alter table todos enable row level security;
create policy "Allow all access" on todos for all using (true) with check (true);"#;

/// Query operations against the task table.
pub trait TaskStore: Send + Sync {
    /// Schema-qualified table name, e.g. `public.todos`
    fn qualified_table(&self) -> String;

    /// Every record, newest `created_at` first
    fn list_all(&self) -> impl Future<Output = Result<Vec<TaskRecord>>> + Send;

    /// Insert and return the stored row, including store-assigned fields
    fn insert(&self, record: &NewTaskRecord) -> impl Future<Output = Result<TaskRecord>> + Send;

    fn update_completion(
        &self,
        id: &str,
        is_completed: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Deleting an id that no longer exists succeeds
    fn delete_by_id(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Bulk delete. An empty id set must not issue a request.
    fn delete_by_ids(&self, ids: &[String]) -> impl Future<Output = Result<()>> + Send;
}

/// Whether a store failure means the backing table has not been provisioned.
///
/// True when the code is the relation-missing code, or the message names the
/// qualified table.
pub fn is_relation_missing(err: &StoreError, qualified_table: &str) -> bool {
    matches!(
        err.code.as_deref(),
        Some(RELATION_MISSING_CODE) | Some(SCHEMA_CACHE_MISS_CODE)
    ) || err.message.contains(qualified_table)
}

/// Map a failed `list_all` into `SetupRequired` or `FetchFailed`
pub fn classify_fetch_error(err: TodoError, qualified_table: &str) -> TodoError {
    match err {
        TodoError::Store(store_err) if is_relation_missing(&store_err, qualified_table) => {
            TodoError::SetupRequired(store_err)
        },
        TodoError::SetupRequired(store_err) => TodoError::SetupRequired(store_err),
        TodoError::Store(store_err) => TodoError::FetchFailed(store_err.message),
        other => TodoError::FetchFailed(other.to_string()),
    }
}

/// Stable sort, newest first
pub(crate) fn sort_newest_first(records: &mut [TaskRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
