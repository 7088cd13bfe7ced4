use anyhow::{Context, Result};
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Json},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::models::ApiError;
use crate::analysis::TaskAnalyzer;
use crate::app::TodoApp;
use crate::store::TaskStore;

/// State shared across handlers
pub type SharedApp<S, A> = Arc<TodoApp<S, A>>;

/// Browser-facing JSON API over a [`TodoApp`]
pub struct TodoServer<S, A> {
    port: u16,
    app: SharedApp<S, A>,
}

impl<S, A> TodoServer<S, A>
where
    S: TaskStore + 'static,
    A: TaskAnalyzer + 'static,
{
    pub fn new(port: u16, app: SharedApp<S, A>) -> Self {
        Self { port, app }
    }

    /// Bind to localhost and serve until the process exits
    pub async fn run(self) -> Result<()> {
        let addr = format!("127.0.0.1:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        tracing::info!("API server listening on {}", addr);
        serve(listener, self.app).await
    }
}

/// Load the initial list, then serve `app` on an already-bound listener
pub async fn serve<S, A>(listener: TcpListener, app: SharedApp<S, A>) -> Result<()>
where
    S: TaskStore + 'static,
    A: TaskAnalyzer + 'static,
{
    if let Err(e) = app.fetch().await {
        tracing::warn!("Initial fetch failed: {}", e);
    }

    axum::serve(listener, create_router(app))
        .await
        .context("Server error")?;
    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router<S, A>(app: SharedApp<S, A>) -> Router
where
    S: TaskStore + 'static,
    A: TaskAnalyzer + 'static,
{
    Router::new()
        .nest("/api", super::routes::api_routes::<S, A>())
        .fallback(not_found_handler)
        .with_state(app)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            code: "NOT_FOUND".to_string(),
            message: "The requested resource was not found".to_string(),
        }),
    )
}
