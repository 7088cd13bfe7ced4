use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::TodoError;

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
}

/// Completion update request
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub is_completed: bool,
}

#[derive(Serialize)]
pub struct SetupSqlResponse {
    pub sql: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

pub fn status_for(err: &TodoError) -> StatusCode {
    match err {
        TodoError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TodoError::TaskNotFound(_) => StatusCode::NOT_FOUND,
        TodoError::AnalysisInProgress => StatusCode::CONFLICT,
        TodoError::SetupRequired(_) => StatusCode::SERVICE_UNAVAILABLE,
        TodoError::AddFailed(_) | TodoError::FetchFailed(_) | TodoError::MutationFailed(_) => {
            StatusCode::BAD_GATEWAY
        },
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        (
            status,
            Json(ApiError {
                code: self.to_error_code().to_string(),
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
