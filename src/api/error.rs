//! Error responses for the task endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::types::ErrorResponse;
use crate::task::TaskValidationError;

#[derive(Debug)]
pub enum ApiError {
    /// Body is not parseable JSON.
    InvalidJson,
    /// Body parsed but is not a valid task.
    Validation(TaskValidationError),
    /// Secret does not match the configured one.
    InvalidSecret,
    /// Anything else on the synchronous path.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidSecret => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidJson => "Invalid JSON".to_string(),
            ApiError::Validation(e) => e.to_string(),
            ApiError::InvalidSecret => "Invalid secret".to_string(),
            ApiError::Internal(msg) => msg.clone(),
        }
    }
}

impl From<TaskValidationError> for ApiError {
    fn from(e: TaskValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
