//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Required input missing or malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Track metadata or a playable audio URL could not be obtained
    #[error("Resolution failed: {0}")]
    ResolutionFailed(String),

    /// An account with the same email is already registered
    #[error("User already exists")]
    AlreadyExists,

    /// Transport failure talking to an external dependency
    #[error("Upstream unreachable: {0}")]
    Unreachable(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl ApiError {
    /// HTTP status the error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::AlreadyExists => StatusCode::BAD_REQUEST,
            ApiError::ResolutionFailed(_)
            | ApiError::Unreachable(_)
            | ApiError::InternalServerError
            | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            ApiError::InvalidRequest(msg) => msg,
            ApiError::ResolutionFailed(msg) => msg,
            ApiError::AlreadyExists => "User already exists".to_string(),
            ApiError::Unreachable(_) => "Upstream media host unreachable".to_string(),
            ApiError::InternalServerError => "Internal server error".to_string(),
            ApiError::Database(_) => "Database error".to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
