//! Enrichment pipeline and list reconciliation, driven through `TodoApp`
//! against the in-memory store.

mod common;

use chrono::{Duration, Utc};
use common::{jeju_analysis, FailingAnalyzer, FixedAnalyzer, GatedAnalyzer};
use smart_todo::app::{Submission, TodoApp, ViewMode, ADD_FAILED_MESSAGE};
use smart_todo::error::{StoreError, TodoError};
use smart_todo::models::{AnalysisResult, TaskRecord};
use smart_todo::priority::Priority;
use smart_todo::store::{MemoryTaskStore, TaskStore};
use std::sync::Arc;

fn record(id: &str, completed: bool, age_mins: i64) -> TaskRecord {
    TaskRecord {
        id: id.to_string(),
        title: format!("Task {}", id),
        is_completed: completed,
        priority: Priority::Medium,
        sub_tasks: Vec::new(),
        created_at: Utc::now() - Duration::minutes(age_mins),
    }
}

fn seeded_store() -> MemoryTaskStore {
    MemoryTaskStore::with_records(vec![
        record("a", true, 30),
        record("b", false, 20),
        record("c", true, 10),
        record("d", false, 5),
    ])
}

async fn ready_app<A: smart_todo::analysis::TaskAnalyzer>(
    store: MemoryTaskStore,
    analyzer: A,
) -> TodoApp<MemoryTaskStore, A> {
    let app = TodoApp::new(store, analyzer);
    app.fetch().await.unwrap();
    app
}

// ============================================================================
// Adding tasks
// ============================================================================

#[tokio::test]
async fn test_add_task_persists_analysis() {
    let app = ready_app(MemoryTaskStore::new(), FixedAnalyzer::new(jeju_analysis())).await;

    let record = app.add_task("Plan trip to Jeju").await.unwrap();

    assert_eq!(record.priority, Priority::High);
    assert_eq!(record.sub_tasks.len(), 3);
    assert!(!record.is_completed);

    let stored = app.store().snapshot();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].priority, Priority::High);
    assert_eq!(stored[0].sub_tasks, vec!["Book flight", "Book hotel", "Make itinerary"]);
}

#[tokio::test]
async fn test_add_task_prepends_store_record() {
    let app = ready_app(seeded_store(), FixedAnalyzer::new(jeju_analysis())).await;
    let before = app.stats();

    let record = app.add_task("New task").await.unwrap();

    let tasks = app.tasks();
    assert_eq!(tasks[0], record);
    assert_eq!(app.stats().total, before.total + 1);
    assert_eq!(app.stats().pending, before.pending + 1);
    // The id comes from the store
    assert!(record.id.starts_with("task-"));
}

#[tokio::test]
async fn test_add_with_fallback_analysis_uses_medium() {
    let app = ready_app(
        MemoryTaskStore::new(),
        FixedAnalyzer::new(AnalysisResult::fallback()),
    )
    .await;

    let record = app.add_task("Something vague").await.unwrap();
    assert_eq!(record.priority, Priority::Medium);
    assert!(record.sub_tasks.is_empty());
}

#[tokio::test]
async fn test_blank_title_makes_no_calls() {
    let analyzer = FixedAnalyzer::new(jeju_analysis());
    let app = TodoApp::new(MemoryTaskStore::new(), analyzer);

    for blank in ["", "   ", "\t\n"] {
        let err = app.add_task(blank).await.unwrap_err();
        assert!(matches!(err, TodoError::InvalidInput(_)));
    }

    assert_eq!(app.store().request_count(), 0);
    assert!(!app.is_analyzing());
    assert_eq!(app.submission(), Submission::Idle);
}

#[tokio::test]
async fn test_store_failure_on_add() {
    let app = ready_app(seeded_store(), FixedAnalyzer::new(jeju_analysis())).await;
    let before = app.tasks();
    app.set_input("Plan trip to Jeju").unwrap();
    app.store()
        .fail_with(StoreError::new(Some("23514"), "check constraint violated"));

    let err = app.submit().await.unwrap_err();

    assert_eq!(err.to_error_code(), "ADD_FAILED");
    assert_eq!(app.tasks(), before);
    assert_eq!(app.error().as_deref(), Some(ADD_FAILED_MESSAGE));
    assert!(!app.is_analyzing());
    // The typed title is not restored to the input
    assert_eq!(app.input(), "");
    assert!(matches!(
        app.submission(),
        Submission::Failed { ref title, .. } if title == "Plan trip to Jeju"
    ));
}

#[tokio::test]
async fn test_analyzer_error_becomes_add_failed() {
    let app = ready_app(seeded_store(), FailingAnalyzer).await;
    let requests_before = app.store().request_count();

    let err = app.add_task("Call the bank").await.unwrap_err();

    assert!(matches!(err, TodoError::AddFailed(_)));
    assert!(!app.is_analyzing());
    assert_eq!(app.store().request_count(), requests_before);
    assert_eq!(app.stats().total, 4);
}

#[tokio::test]
async fn test_second_add_rejected_while_analyzing() {
    let analyzer = GatedAnalyzer::new();
    let started = analyzer.started.clone();
    let release = analyzer.release.clone();
    let app = Arc::new(ready_app(MemoryTaskStore::new(), analyzer).await);

    let first = tokio::spawn({
        let app = app.clone();
        async move { app.add_task("First").await }
    });
    started.notified().await;

    assert!(app.is_analyzing());
    assert!(matches!(
        app.add_task("Second").await,
        Err(TodoError::AnalysisInProgress)
    ));
    assert!(matches!(
        app.set_input("typing"),
        Err(TodoError::AnalysisInProgress)
    ));
    assert!(matches!(
        app.submission(),
        Submission::Pending { ref title } if title == "First"
    ));

    release.notify_one();
    let record = first.await.unwrap().unwrap();
    assert_eq!(record.title, "First");
    assert!(!app.is_analyzing());
    assert_eq!(app.stats().total, 1);

    // Gate is open again
    app.set_input("Second").unwrap();
}

#[tokio::test]
async fn test_abandoned_add_returns_to_idle() {
    let analyzer = GatedAnalyzer::new();
    let started = analyzer.started.clone();
    let app = Arc::new(ready_app(MemoryTaskStore::new(), analyzer).await);

    let pending = tokio::spawn({
        let app = app.clone();
        async move { app.add_task("Dropped midway").await }
    });
    started.notified().await;
    assert!(matches!(app.submission(), Submission::Pending { .. }));

    // Dropping the future mid-analysis, as a disconnected HTTP client does
    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());

    assert!(!app.is_analyzing());
    assert_eq!(app.submission(), Submission::Idle);
    assert_eq!(app.stats().total, 0);
    assert_eq!(app.store().snapshot().len(), 0);
}

#[tokio::test]
async fn test_successful_add_clears_previous_error() {
    let app = ready_app(MemoryTaskStore::new(), FixedAnalyzer::new(jeju_analysis())).await;
    app.store().fail_with(StoreError::new(None, "timeout"));
    assert!(app.add_task("One").await.is_err());
    assert!(app.error().is_some());

    app.store().recover();
    app.add_task("Two").await.unwrap();
    assert_eq!(app.error(), None);
}

// ============================================================================
// Fetching and setup mode
// ============================================================================

#[tokio::test]
async fn test_fetch_orders_newest_first() {
    let app = ready_app(seeded_store(), FixedAnalyzer::new(jeju_analysis())).await;
    let tasks = app.tasks();
    for pair in tasks.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
    assert_eq!(tasks[0].id, "d");
}

#[tokio::test]
async fn test_setup_required_then_recovered() {
    let app = TodoApp::new(
        MemoryTaskStore::missing_table(),
        FixedAnalyzer::new(jeju_analysis()),
    );

    let err = app.fetch().await.unwrap_err();
    assert_eq!(err.to_error_code(), "SETUP_REQUIRED");
    assert!(matches!(app.mode(), ViewMode::SetupRequired { .. }));

    // Normal operation is blocked until provisioned
    let requests = app.store().request_count();
    assert!(matches!(
        app.add_task("Anything").await,
        Err(TodoError::SetupRequired(_))
    ));
    assert_eq!(app.store().request_count(), requests);

    app.store().recover();
    app.store()
        .insert(&smart_todo::models::NewTaskRecord::from_analysis(
            "Provisioned",
            &jeju_analysis(),
            Utc::now(),
        ))
        .await
        .unwrap();

    app.fetch().await.unwrap();
    assert_eq!(app.mode(), ViewMode::Ready);
    assert_eq!(app.stats().total, 1);
    assert_eq!(app.error(), None);
}

#[tokio::test]
async fn test_fetch_failure_keeps_list() {
    let app = ready_app(seeded_store(), FixedAnalyzer::new(jeju_analysis())).await;
    let before = app.tasks();

    app.store()
        .fail_with(StoreError::new(Some("PGRST301"), "JWT expired"));
    let err = app.fetch().await.unwrap_err();

    assert_eq!(err.to_error_code(), "FETCH_FAILED");
    assert_eq!(
        app.mode(),
        ViewMode::FetchFailed {
            message: "JWT expired".to_string()
        }
    );
    assert_eq!(app.tasks(), before);
    assert_eq!(app.error().as_deref(), Some("JWT expired"));

    app.store().recover();
    app.fetch().await.unwrap();
    assert_eq!(app.mode(), ViewMode::Ready);
}

// ============================================================================
// Toggle / delete / clear completed
// ============================================================================

#[tokio::test]
async fn test_toggle_flips_one_record() {
    let app = ready_app(seeded_store(), FixedAnalyzer::new(jeju_analysis())).await;
    let before = app.tasks();

    let now_completed = app.toggle("b").await.unwrap();
    assert!(now_completed);

    let after = app.tasks();
    assert_eq!(after.len(), before.len());
    let changed: Vec<_> = before
        .iter()
        .zip(&after)
        .filter(|(b, a)| b != a)
        .collect();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].1.id, "b");
    assert!(changed[0].1.is_completed);

    let stored = app.store().snapshot();
    assert!(stored.iter().find(|r| r.id == "b").unwrap().is_completed);
}

#[tokio::test]
async fn test_toggle_failure_leaves_state() {
    let app = ready_app(seeded_store(), FixedAnalyzer::new(jeju_analysis())).await;
    let before = app.tasks();
    app.store().fail_with(StoreError::new(None, "offline"));

    let err = app.toggle("b").await.unwrap_err();
    assert_eq!(err.to_error_code(), "MUTATION_FAILED");
    assert_eq!(app.tasks(), before);
    // Mutation failures are not surfaced in the UI state
    assert_eq!(app.error(), None);
}

#[tokio::test]
async fn test_double_delete_is_tolerated() {
    let app = ready_app(seeded_store(), FixedAnalyzer::new(jeju_analysis())).await;

    app.delete("c").await.unwrap();
    app.delete("c").await.unwrap();

    assert_eq!(app.stats().total, 3);
    assert!(app.tasks().iter().all(|t| t.id != "c"));
}

#[tokio::test]
async fn test_clear_completed() {
    let app = ready_app(seeded_store(), FixedAnalyzer::new(jeju_analysis())).await;
    let before = app.stats();
    assert_eq!(before.completed, 2);

    let removed = app.clear_completed().await.unwrap();

    assert_eq!(removed, 2);
    let after = app.stats();
    assert_eq!(after.total, before.total - 2);
    assert_eq!(after.completed, 0);
    assert_eq!(after.pending, before.pending);
    assert_eq!(app.store().snapshot().len(), 2);
}

#[tokio::test]
async fn test_clear_completed_with_none_makes_no_request() {
    let store = MemoryTaskStore::with_records(vec![record("x", false, 1)]);
    let app = ready_app(store, FixedAnalyzer::new(jeju_analysis())).await;
    let requests = app.store().request_count();

    assert_eq!(app.clear_completed().await.unwrap(), 0);
    assert_eq!(app.store().request_count(), requests);
    assert_eq!(app.stats().total, 1);
}
