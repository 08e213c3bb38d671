//! Service error kinds.
//!
//! Every lower-level failure is mapped to one of the three kinds below before
//! it leaves the service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Field Errors
// =============================================================================

/// Field-level error for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field that failed validation (wire name, e.g. `dueDate`).
    pub field: String,
    /// Error message for this field.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation error carrying every offending field of a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    /// Field-level errors.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub const fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Creates a validation error with a single field error.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }

    /// Returns true if there are no validation errors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records another field error.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Returns `Ok(value)` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Returns the message of the first error for `field`, if any.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();
        write!(formatter, "{}", messages.join(", "))
    }
}

// =============================================================================
// Service Error
// =============================================================================

/// Errors surfaced by the task service and its gateways.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// A supplied field is missing, malformed or oversized.
    #[error("Validation failed: {0}")]
    Validation(ValidationError),

    /// The referenced task does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The store is unreachable or something unexpected happened.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Creates a not-found error for the given task id.
    #[must_use]
    pub fn task_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("Task {id} not found"))
    }

    /// Returns the user-facing message of the error.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation(_) => "Validation failed".to_string(),
            Self::NotFound(message) | Self::Internal(message) => message.clone(),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error)
    }
}
