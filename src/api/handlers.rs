//! HTTP handlers for the task API.
//!
//! Handlers are thin: they extract the request, call [`TaskService`] and map
//! its errors through [`ApiErrorResponse`]. JSON bodies are taken as
//! `Result<Json<_>, JsonRejection>` so that malformed payloads produce the
//! same validation error body as any other invalid input.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use super::error::ApiErrorResponse;
use crate::domain::Task;
use crate::infrastructure::Repositories;
use crate::service::{CreateTaskRequest, TaskService, UpdateTaskRequest};

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Task service used by every handler.
    pub service: TaskService,
}

impl AppState {
    /// Creates a new `AppState` around a task service.
    #[must_use]
    pub const fn new(service: TaskService) -> Self {
        Self { service }
    }

    /// Creates a new `AppState` from initialized repositories.
    #[must_use]
    pub fn from_repositories(repositories: Repositories) -> Self {
        Self::new(TaskService::new(repositories.task_repository))
    }
}

// =============================================================================
// Task Handlers
// =============================================================================

/// `GET /tasks`: every task, newest first.
///
/// # Errors
///
/// Returns 500 if the store cannot be read.
pub async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<Task>>, ApiErrorResponse> {
    let tasks = state.service.list().await?;
    Ok(Json(tasks))
}

/// `POST /tasks`: creates a task.
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Buy milk",
///   "description": "Optional description",
///   "priority": "LOW|MEDIUM|HIGH|URGENT",
///   "dueDate": "2025-10-02"
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: the created task
/// - **400 Bad Request**: validation error
/// - **500 Internal Server Error**: the task could not be stored
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the 400 and 500 cases above.
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiErrorResponse> {
    let Json(request) = payload?;
    let task = state.service.create(request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PATCH /tasks/{id}`: partial update.
///
/// Only fields present in the body change. `description` and `dueDate`
/// accept `null` to clear them.
///
/// # Errors
///
/// Returns 400 for a malformed id or invalid field, 404 for an unknown id
/// and 500 if the store fails.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiErrorResponse> {
    let Json(request) = payload?;
    let task = state.service.update(&id, request).await?;
    Ok(Json(task))
}

/// `DELETE /tasks/{id}`: deletes a task and returns it.
///
/// # Errors
///
/// Returns 400 for a malformed id, 404 for an unknown id and 500 if the
/// store fails.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiErrorResponse> {
    let task = state.service.delete(&id).await?;
    Ok(Json(task))
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Health check endpoint.
///
/// ```json
/// { "status": "healthy", "version": "0.1.0" }
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
