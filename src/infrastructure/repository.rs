//! Repository trait for the task table.
//!
//! Operations return boxed `'static` futures so the trait stays object safe
//! and can be shared as `Arc<dyn TaskRepository>`.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Task, TaskId, TaskPatch};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Database query or connection error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored row could not be mapped back to a task.
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// The store cannot be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Task Repository
// =============================================================================

/// Persistence operations on the single task table.
pub trait TaskRepository: Send + Sync {
    /// Returns every task, newest `created_at` first.
    ///
    /// Tasks sharing a `created_at` are returned newest-inserted first.
    fn list(&self) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>>;

    /// Inserts a new task.
    fn insert(&self, task: &Task) -> BoxFuture<'static, Result<Task, RepositoryError>>;

    /// Applies a partial update to the task with the given id.
    ///
    /// Returns `Ok(None)` when no such task exists; nothing is written then.
    fn update(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>>;

    /// Deletes the task with the given id and returns the removed record.
    ///
    /// Returns `Ok(None)` when no such task exists.
    fn delete(&self, id: &TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>>;
}
