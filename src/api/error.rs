//! API error handling.
//!
//! Error bodies have the shape `{ "code", "message", "details"? }`. The three
//! service error kinds map to `VALIDATION_ERROR` (400), `NOT_FOUND` (404) and
//! `INTERNAL_ERROR` (500).

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::service::{FieldError, ServiceError, ValidationError};

/// Error code for validation failures.
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
/// Error code for unknown task ids.
pub const NOT_FOUND: &str = "NOT_FOUND";
/// Error code for store and unexpected failures.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

// =============================================================================
// API Error
// =============================================================================

/// API error structure for JSON responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Field-level errors, present for validation failures only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a validation error with field-level details.
    #[must_use]
    pub fn validation(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self {
            code: VALIDATION_ERROR.to_string(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Converts an error body back into a service error.
///
/// Unknown codes are treated as internal errors.
impl From<ApiError> for ServiceError {
    fn from(error: ApiError) -> Self {
        match error.code.as_str() {
            VALIDATION_ERROR => Self::Validation(ValidationError::new(
                error.details.unwrap_or_default(),
            )),
            NOT_FOUND => Self::NotFound(error.message),
            _ => Self::Internal(error.message),
        }
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error details.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 Bad Request response for validation errors.
    #[must_use]
    pub fn validation_error(message: impl Into<String>, details: Vec<FieldError>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::validation(message, details),
        )
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new(NOT_FOUND, message))
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new(INTERNAL_ERROR, message),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        Self::validation_error("Validation failed", error.errors)
    }
}

impl From<ServiceError> for ApiErrorResponse {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Validation(validation) => validation.into(),
            ServiceError::NotFound(message) => Self::not_found(message),
            ServiceError::Internal(message) => Self::internal_error(message),
        }
    }
}

/// Malformed or mistyped JSON bodies are reported as validation errors.
impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::from(ValidationError::single("body", rejection.body_text()))
    }
}

// =============================================================================
// Tests
// =============================================================================
