//! REST gateway.
//!
//! Maps HTTP verb + path onto the typed requests `TeamService` understands
//! and encodes its responses as JSON.

mod members;
mod teams;

pub use members::*;
pub use teams::*;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::ApiResponse;

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either an envelope or a transport-level error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Query parameters shared by the path-addressed operations.
#[derive(Debug, Default, Deserialize)]
pub struct ApiParams {
    #[serde(default)]
    pub api: String,
    /// Requesting user for ownership checks
    #[serde(default)]
    pub user_id: String,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| AppError::BadRequest(format!("malformed body: {}", e.body_text())))
}

fn query<T>(params: Result<axum::extract::Query<T>, QueryRejection>) -> Result<T, AppError> {
    params
        .map(|axum::extract::Query(value)| value)
        .map_err(|e| AppError::BadRequest(format!("malformed query: {}", e.body_text())))
}
