use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers;
use super::server::SharedApp;
use crate::analysis::TaskAnalyzer;
use crate::store::TaskStore;

/// Create API router with all endpoints
pub fn api_routes<S, A>() -> Router<SharedApp<S, A>>
where
    S: TaskStore + 'static,
    A: TaskAnalyzer + 'static,
{
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/todos",
            get(handlers::list_todos::<S, A>).post(handlers::create_todo::<S, A>),
        )
        .route("/todos/refresh", post(handlers::refresh_todos::<S, A>))
        .route(
            "/todos/clear-completed",
            post(handlers::clear_completed::<S, A>),
        )
        .route(
            "/todos/:id",
            patch(handlers::update_todo::<S, A>).delete(handlers::delete_todo::<S, A>),
        )
        .route("/setup-sql", get(handlers::setup_sql))
}
