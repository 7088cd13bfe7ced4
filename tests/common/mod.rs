//! Shared fixtures for integration tests: scripted analyzers and local axum
//! fakes for the persistence and generation APIs.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use smart_todo::analysis::TaskAnalyzer;
use smart_todo::error::{Result, TodoError};
use smart_todo::models::AnalysisResult;
use smart_todo::priority::Priority;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Bind `router` to an ephemeral localhost port and return its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Path to the `stodo` binary
pub fn stodo_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_stodo"))
}

/// `stodo` command with every configuration variable cleared
pub fn stodo_command() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(stodo_binary());
    for var in [
        "STODO_SUPABASE_URL",
        "SUPABASE_URL",
        "STODO_SUPABASE_KEY",
        "SUPABASE_ANON_KEY",
        "STODO_TABLE",
        "STODO_GEMINI_API_KEY",
        "GEMINI_API_KEY",
        "API_KEY",
        "STODO_GEMINI_MODEL",
        "STODO_GEMINI_ENDPOINT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// ============================================================================
// Scripted analyzers
// ============================================================================

pub fn jeju_analysis() -> AnalysisResult {
    AnalysisResult {
        suggested_priority: Priority::High,
        sub_tasks: vec![
            "Book flight".to_string(),
            "Book hotel".to_string(),
            "Make itinerary".to_string(),
        ],
        reasoning: "Time-sensitive".to_string(),
    }
}

/// Returns a fixed result and counts calls
pub struct FixedAnalyzer {
    pub result: AnalysisResult,
    pub calls: AtomicUsize,
}

impl FixedAnalyzer {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TaskAnalyzer for FixedAnalyzer {
    async fn analyze(&self, _title: &str) -> Result<AnalysisResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}

/// Always fails, like a transport error that was not absorbed
pub struct FailingAnalyzer;

impl TaskAnalyzer for FailingAnalyzer {
    async fn analyze(&self, _title: &str) -> Result<AnalysisResult> {
        Err(TodoError::AnalysisFailed("connection reset".to_string()))
    }
}

/// Blocks until released, to hold an analysis in flight
pub struct GatedAnalyzer {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl GatedAnalyzer {
    pub fn new() -> Self {
        Self {
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

impl TaskAnalyzer for GatedAnalyzer {
    async fn analyze(&self, _title: &str) -> Result<AnalysisResult> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(AnalysisResult::fallback())
    }
}

// ============================================================================
// Fake PostgREST table
// ============================================================================

#[derive(Clone, Default)]
pub struct FakePostgrest {
    pub rows: Arc<Mutex<Vec<Value>>>,
    /// (method, decoded query params) per request
    pub requests: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
    pub missing_table: Arc<AtomicBool>,
    pub next_id: Arc<AtomicUsize>,
}

impl FakePostgrest {
    pub fn with_rows(rows: Vec<Value>) -> Self {
        let fake = Self::default();
        *fake.rows.lock().unwrap() = rows;
        fake
    }

    pub fn requests(&self) -> Vec<(String, HashMap<String, String>)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn rows(&self) -> Vec<Value> {
        self.rows.lock().unwrap().clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(
                "/rest/v1/todos",
                get(pg_select)
                    .post(pg_insert)
                    .patch(pg_update)
                    .delete(pg_delete),
            )
            .with_state(self.clone())
    }

    pub async fn spawn(&self) -> String {
        spawn_server(self.router()).await
    }

    fn record(&self, method: &str, params: &HashMap<String, String>) {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));
    }

    fn guard(&self, headers: &HeaderMap) -> Option<(StatusCode, Json<Value>)> {
        if headers.get("apikey").is_none() {
            return Some((
                StatusCode::UNAUTHORIZED,
                Json(json!({"code": "PGRST301", "message": "No API key found in request"})),
            ));
        }
        if self.missing_table.load(Ordering::SeqCst) {
            return Some((
                StatusCode::NOT_FOUND,
                Json(json!({
                    "code": "42P01",
                    "details": null,
                    "hint": null,
                    "message": "relation \"public.todos\" does not exist"
                })),
            ));
        }
        None
    }
}

/// Ids addressed by an `eq.` or `in.(...)` filter
fn filter_ids(params: &HashMap<String, String>) -> Vec<String> {
    let Some(filter) = params.get("id") else {
        return Vec::new();
    };
    if let Some(id) = filter.strip_prefix("eq.") {
        return vec![id.to_string()];
    }
    if let Some(list) = filter
        .strip_prefix("in.(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return list
            .split(',')
            .map(|s| s.trim_matches('"').to_string())
            .collect();
    }
    Vec::new()
}

async fn pg_select(
    State(fake): State<FakePostgrest>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    fake.record("GET", &params);
    if let Some(err) = fake.guard(&headers) {
        return err.into_response();
    }
    // Insertion order on purpose; the client must not rely on server ordering
    Json(Value::Array(fake.rows())).into_response()
}

async fn pg_insert(
    State(fake): State<FakePostgrest>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Vec<Value>>,
) -> impl IntoResponse {
    fake.record("POST", &params);
    if let Some(err) = fake.guard(&headers) {
        return err.into_response();
    }
    let wants_rows = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("return=representation"));

    let mut inserted = Vec::new();
    for mut row in body {
        let n = fake.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        row["id"] = json!(format!("00000000-0000-0000-0000-{:012}", n));
        fake.rows.lock().unwrap().push(row.clone());
        inserted.push(row);
    }

    if wants_rows {
        (StatusCode::CREATED, Json(Value::Array(inserted))).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn pg_update(
    State(fake): State<FakePostgrest>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(patch): Json<Value>,
) -> impl IntoResponse {
    fake.record("PATCH", &params);
    if let Some(err) = fake.guard(&headers) {
        return err.into_response();
    }
    let ids = filter_ids(&params);
    for row in fake.rows.lock().unwrap().iter_mut() {
        if ids.iter().any(|id| row["id"] == json!(id)) {
            if let Some(fields) = patch.as_object() {
                for (k, v) in fields {
                    row[k] = v.clone();
                }
            }
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn pg_delete(
    State(fake): State<FakePostgrest>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    fake.record("DELETE", &params);
    if let Some(err) = fake.guard(&headers) {
        return err.into_response();
    }
    let ids = filter_ids(&params);
    fake.rows
        .lock()
        .unwrap()
        .retain(|row| !ids.iter().any(|id| row["id"] == json!(id)));
    StatusCode::NO_CONTENT.into_response()
}

// ============================================================================
// Fake Gemini generateContent
// ============================================================================

#[derive(Clone)]
pub enum GeminiReply {
    /// A candidate whose text is the given string
    Text(String),
    Status(u16),
    NoCandidates,
}

#[derive(Clone)]
pub struct FakeGemini {
    pub reply: Arc<Mutex<GeminiReply>>,
    pub requests: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

impl FakeGemini {
    pub fn new(reply: GeminiReply) -> Self {
        Self {
            reply: Arc::new(Mutex::new(reply)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// (path segment, api key header, body) per request
    pub fn requests(&self) -> Vec<(String, Option<String>, Value)> {
        self.requests.lock().unwrap().clone()
    }

    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/v1beta/models/:call", post(gemini_generate))
            .with_state(self.clone());
        format!("{}/v1beta", spawn_server(router).await)
    }
}

async fn gemini_generate(
    State(fake): State<FakeGemini>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    fake.requests.lock().unwrap().push((call, key, body));

    let reply = fake.reply.lock().unwrap().clone();
    match reply {
        GeminiReply::Text(text) => Json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        GeminiReply::Status(code) => (
            StatusCode::from_u16(code).unwrap(),
            Json(json!({"error": {"code": code, "message": "backend error"}})),
        )
            .into_response(),
        GeminiReply::NoCandidates => Json(json!({ "promptFeedback": {} })).into_response(),
    }
}
