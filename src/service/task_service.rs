//! The task service: list, create, update and delete.
//!
//! The service is stateless between calls. It validates requests, talks to the
//! repository and maps every repository failure to a generic
//! [`ServiceError::Internal`] after logging the details.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::{Task, TaskId, Timestamp};
use crate::infrastructure::{RepositoryError, TaskRepository};

use super::error::ServiceError;
use super::input::{
    CreateTaskRequest, NewTask, UpdateTaskRequest, parse_task_id, validate_create_request,
    validate_update_request,
};

/// Application service for task CRUD.
#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TaskService")
            .field("repository", &"Arc<dyn TaskRepository>")
            .finish()
    }
}

/// Logs a repository failure and replaces it with a generic message.
fn internal(
    operation: &'static str,
    message: &'static str,
) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |repository_error| {
        error!(operation, error = %repository_error, "Repository operation failed");
        ServiceError::Internal(message.to_string())
    }
}

/// Builds a new task from validated input, generating its id and timestamp.
fn build_task(new_task: NewTask) -> Task {
    Task {
        id: TaskId::generate(),
        title: new_task.title,
        description: new_task.description,
        completed: false,
        priority: new_task.priority,
        due_date: new_task.due_date,
        created_at: Timestamp::now(),
    }
}

impl TaskService {
    /// Creates a service over the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    /// Returns every task, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Internal` if the store cannot be read.
    pub async fn list(&self) -> Result<Vec<Task>, ServiceError> {
        self.repository
            .list()
            .await
            .map_err(internal("list", "Failed to fetch tasks"))
    }

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for invalid input and
    /// `ServiceError::Internal` if the task cannot be stored.
    pub async fn create(&self, request: CreateTaskRequest) -> Result<Task, ServiceError> {
        let new_task = validate_create_request(&request)?;
        let task = build_task(new_task);

        let created = self
            .repository
            .insert(&task)
            .await
            .map_err(internal("create", "Failed to create task"))?;

        info!(task_id = %created.id, "Task created");
        Ok(created)
    }

    /// Applies a partial update to the task with the given id.
    ///
    /// Fields absent from the request are left untouched. An update with no
    /// fields returns the stored task unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a malformed id or invalid field,
    /// `ServiceError::NotFound` if the task does not exist and
    /// `ServiceError::Internal` if the store fails.
    pub async fn update(&self, id: &str, request: UpdateTaskRequest) -> Result<Task, ServiceError> {
        let task_id = parse_task_id(id)?;
        let patch = validate_update_request(&request)?;

        let updated = self
            .repository
            .update(&task_id, &patch)
            .await
            .map_err(internal("update", "Failed to update task"))?
            .ok_or_else(|| ServiceError::task_not_found(task_id))?;

        info!(task_id = %task_id, "Task updated");
        Ok(updated)
    }

    /// Deletes the task with the given id and returns the removed record.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a malformed id,
    /// `ServiceError::NotFound` if the task does not exist and
    /// `ServiceError::Internal` if the store fails.
    pub async fn delete(&self, id: &str) -> Result<Task, ServiceError> {
        let task_id = parse_task_id(id)?;

        let deleted = self
            .repository
            .delete(&task_id)
            .await
            .map_err(internal("delete", "Failed to delete task"))?
            .ok_or_else(|| ServiceError::task_not_found(task_id))?;

        info!(task_id = %task_id, "Task deleted");
        Ok(deleted)
    }
}
