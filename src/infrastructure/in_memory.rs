//! In-memory task repository.
//!
//! Tasks are kept in insertion order behind an `Arc<RwLock<...>>`. Each write
//! holds the lock for the whole read-modify-write, which gives the same
//! per-row atomicity a database provides.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{Task, TaskId, TaskPatch};
use crate::infrastructure::{RepositoryError, TaskRepository};

/// In-memory implementation of `TaskRepository`.
#[derive(Debug, Clone)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<Vec<Task>>>,
    available: Arc<AtomicBool>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(Vec::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Marks the store as reachable or unreachable.
    ///
    /// While unavailable every operation fails with
    /// [`RepositoryError::Unavailable`]. Clones share this flag.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(available: &AtomicBool) -> Result<(), RepositoryError> {
        if available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepositoryError::Unavailable(
                "in-memory store is offline".to_string(),
            ))
        }
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for InMemoryTaskRepository {
    fn list(&self) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        let available = Arc::clone(&self.available);
        async move {
            Self::ensure_available(&available)?;
            let guard = tasks.read().await;
            let mut listed: Vec<Task> = guard.iter().rev().cloned().collect();
            // Stable sort keeps newest-inserted first among equal timestamps.
            listed.sort_by(|left, right| right.created_at.cmp(&left.created_at));
            Ok(listed)
        }
        .boxed()
    }

    fn insert(&self, task: &Task) -> BoxFuture<'static, Result<Task, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        let available = Arc::clone(&self.available);
        let task = task.clone();
        async move {
            Self::ensure_available(&available)?;
            let mut guard = tasks.write().await;
            if guard.iter().any(|existing| existing.id == task.id) {
                return Err(RepositoryError::DatabaseError(format!(
                    "duplicate task id {}",
                    task.id
                )));
            }
            guard.push(task.clone());
            Ok(task)
        }
        .boxed()
    }

    fn update(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        let available = Arc::clone(&self.available);
        let id = *id;
        let patch = patch.clone();
        async move {
            Self::ensure_available(&available)?;
            let mut guard = tasks.write().await;
            let Some(slot) = guard.iter_mut().find(|task| task.id == id) else {
                return Ok(None);
            };
            let updated = slot.clone().apply(&patch);
            *slot = updated.clone();
            Ok(Some(updated))
        }
        .boxed()
    }

    fn delete(&self, id: &TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        let available = Arc::clone(&self.available);
        let id = *id;
        async move {
            Self::ensure_available(&available)?;
            let mut guard = tasks.write().await;
            let position = guard.iter().position(|task| task.id == id);
            Ok(position.map(|index| guard.remove(index)))
        }
        .boxed()
    }
}
