//! API error type and its JSON rendering.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cookbook_model::{FieldError, ValidationErrors};
use cookbook_store::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Stable, machine-readable codes carried in every error body.
pub mod error_code {
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INTERNAL: &str = "INTERNAL";
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The payload parsed but broke a field rule. HTTP 400.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The body was not usable JSON. HTTP 400.
    #[error("{0}")]
    BadRequest(String),

    /// No recipe with this id. HTTP 404.
    #[error("recipe {0} not found")]
    NotFound(String),

    /// Anything else. The detail is logged, never returned. HTTP 500.
    #[error("internal server error")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => error_code::VALIDATION_FAILED,
            ApiError::BadRequest(_) => error_code::BAD_REQUEST,
            ApiError::NotFound(_) => error_code::NOT_FOUND,
            ApiError::Internal(_) => error_code::INTERNAL,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ApiError::NotFound(id.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!("Request failed: {}", detail);
        }
        let body = ErrorBody {
            code: self.error_code(),
            message: self.to_string(),
            errors: match &self {
                ApiError::Validation(errors) => Some(errors.errors()),
                _ => None,
            },
        };
        (self.status_code(), axum::Json(body)).into_response()
    }
}
