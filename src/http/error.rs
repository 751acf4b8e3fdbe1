//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::SchedulingError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Scheduling service error
    Scheduling(SchedulingError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Scheduling(err) => return scheduling_error_response(err),
        };

        (status, Json(error)).into_response()
    }
}

fn scheduling_error_response(err: SchedulingError) -> Response {
    let (status, error) = match &err {
        SchedulingError::NotFound(msg) => {
            (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg))
        }
        SchedulingError::InvalidDuration(msg) => (
            StatusCode::BAD_REQUEST,
            ApiError::new("INVALID_DURATION", msg),
        ),
        SchedulingError::InvalidTransition { .. } => (
            StatusCode::CONFLICT,
            ApiError::new("INVALID_TRANSITION", err.to_string()),
        ),
        SchedulingError::InvalidInput(msg) => {
            (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
        }
        SchedulingError::Storage(repo_err) => {
            let code = match repo_err {
                RepositoryError::NotFound(_) => "NOT_FOUND",
                _ => "STORAGE_ERROR",
            };
            let status = match repo_err {
                RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, ApiError::new(code, repo_err.to_string()))
        }
    };

    (status, Json(error)).into_response()
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        AppError::Scheduling(err)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Scheduling(SchedulingError::Storage(err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
