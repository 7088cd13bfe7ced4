use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body reported by the persistence API.
///
/// PostgREST answers failed requests with `{code, message, details, hint}`;
/// only `code` and `message` drive behavior here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// HTTP status of the failed request, when there was one
    #[serde(skip)]
    pub status: Option<u16>,
}

impl StoreError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
            details: None,
            hint: None,
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Error, Debug)]
pub enum TodoError {
    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Database setup required: {0}")]
    SetupRequired(StoreError),

    #[error("Failed to load tasks: {0}")]
    FetchFailed(String),

    #[error("Task analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Failed to add task: {0}")]
    AddFailed(String),

    #[error("Failed to update tasks: {0}")]
    MutationFailed(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A task is already being analyzed")]
    AnalysisInProgress,

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl TodoError {
    pub fn to_error_code(&self) -> &'static str {
        match self {
            TodoError::Store(_) => "STORE_ERROR",
            TodoError::SetupRequired(_) => "SETUP_REQUIRED",
            TodoError::FetchFailed(_) => "FETCH_FAILED",
            TodoError::AnalysisFailed(_) => "ANALYSIS_FAILED",
            TodoError::AddFailed(_) => "ADD_FAILED",
            TodoError::MutationFailed(_) => "MUTATION_FAILED",
            TodoError::TaskNotFound(_) => "TASK_NOT_FOUND",
            TodoError::InvalidInput(_) => "INVALID_INPUT",
            TodoError::AnalysisInProgress => "ANALYSIS_IN_PROGRESS",
            TodoError::NotConfigured(_) => "NOT_CONFIGURED",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;
