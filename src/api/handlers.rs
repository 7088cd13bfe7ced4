use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use super::models::*;
use super::server::SharedApp;
use crate::analysis::TaskAnalyzer;
use crate::error::TodoError;
use crate::store::{TaskStore, SETUP_SQL};

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: "smart-todo",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Current state snapshot
pub async fn list_todos<S: TaskStore, A: TaskAnalyzer>(
    State(app): State<SharedApp<S, A>>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: app.snapshot(),
    })
}

/// Re-fetch from the store. Failures show up in the snapshot's mode.
pub async fn refresh_todos<S: TaskStore, A: TaskAnalyzer>(
    State(app): State<SharedApp<S, A>>,
) -> impl IntoResponse {
    let _ = app.fetch().await;
    Json(ApiResponse {
        data: app.snapshot(),
    })
}

/// Analyze and create a task
pub async fn create_todo<S: TaskStore, A: TaskAnalyzer>(
    State(app): State<SharedApp<S, A>>,
    Json(req): Json<CreateTodoRequest>,
) -> impl IntoResponse {
    match app.add_task(&req.title).await {
        Ok(record) => (StatusCode::CREATED, Json(ApiResponse { data: record })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Set completion. Store failures are logged by the app and not reported.
pub async fn update_todo<S: TaskStore, A: TaskAnalyzer>(
    State(app): State<SharedApp<S, A>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTodoRequest>,
) -> impl IntoResponse {
    match app.set_completion(&id, req.is_completed).await {
        Ok(()) | Err(TodoError::MutationFailed(_)) => Json(ApiResponse {
            data: app.snapshot(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_todo<S: TaskStore, A: TaskAnalyzer>(
    State(app): State<SharedApp<S, A>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match app.delete(&id).await {
        Ok(()) | Err(TodoError::MutationFailed(_)) => Json(ApiResponse {
            data: app.snapshot(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn clear_completed<S: TaskStore, A: TaskAnalyzer>(
    State(app): State<SharedApp<S, A>>,
) -> impl IntoResponse {
    match app.clear_completed().await {
        Ok(_) | Err(TodoError::MutationFailed(_)) => Json(ApiResponse {
            data: app.snapshot(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn setup_sql() -> impl IntoResponse {
    Json(SetupSqlResponse { sql: SETUP_SQL })
}
