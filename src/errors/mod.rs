//! Error handling module for the team service.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.
//! Business-rule rejections are not errors; they travel as a `ResponseStatus`
//! inside a successful envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::service::API_VERSION;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNIMPLEMENTED: &str = "UNIMPLEMENTED";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const DUPLICATE: &str = "DUPLICATE";
    pub const TEAM_FULL: &str = "TEAM_FULL";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Requested API version is not the one this service implements
    Unimplemented(String),
    /// Missing path parameter or malformed body
    BadRequest(String),
    /// No matching record
    NotFound(String),
    /// Store-level uniqueness violation
    Duplicate(String),
    /// No open role left to fill
    TeamFull(String),
    /// Connection, statement or commit failure
    Database(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unimplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::TeamFull(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unimplemented(_) => codes::UNIMPLEMENTED,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Duplicate(_) => codes::DUPLICATE,
            AppError::TeamFull(_) => codes::TEAM_FULL,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unimplemented(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Duplicate(msg)
            | AppError::TeamFull(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg) => msg.clone(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("no matching record found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                tracing::debug!("Unique constraint violation: {}", db_err);
                AppError::Duplicate(format!("Duplicate record: {}", db_err))
            }
            _ => {
                tracing::error!("Database error: {:?}", err);
                AppError::Database(format!("Database error: {}", err))
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub api: String,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            api: API_VERSION.to_string(),
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
