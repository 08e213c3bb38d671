//! Versioned client-side task list.
//!
//! [`TaskSnapshot`] is an immutable list plus a version number. Every action
//! (`set`, `add`, `update`, `remove`, `clear`) produces a new snapshot with
//! the version incremented. [`TaskStore`] owns the current snapshot behind an
//! `ArcSwap`, so readers never block and a rollback is a pointer assignment.

use std::str::FromStr;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::domain::{Task, TaskId, TaskPatch};

// =============================================================================
// Status Filter
// =============================================================================

/// Completion-status filter for a task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Tasks that are not completed.
    Open,
    /// Completed tasks.
    Done,
}

impl StatusFilter {
    /// Returns `true` if `task` passes the filter.
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::Open => !task.completed,
            Self::Done => task.completed,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "done" => Ok(Self::Done),
            other => Err(format!("Unknown status filter: '{other}'. Expected 'open' or 'done'")),
        }
    }
}

// =============================================================================
// Task Board
// =============================================================================

/// Tasks split into display groups, each keeping the service order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskBoard {
    pub active: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskBoard {
    /// Total number of tasks on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len() + self.completed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.completed.is_empty()
    }
}

// =============================================================================
// Task Snapshot
// =============================================================================

/// An immutable, versioned task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    version: u64,
    tasks: Arc<[Task]>,
}

impl Default for TaskSnapshot {
    fn default() -> Self {
        Self {
            version: 0,
            tasks: Arc::from(Vec::new()),
        }
    }
}

impl TaskSnapshot {
    /// Returns the version of this snapshot.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the tasks in service order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Finds a task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn next(&self, tasks: Vec<Task>) -> Self {
        Self {
            version: self.version + 1,
            tasks: Arc::from(tasks),
        }
    }

    /// Replaces the whole list.
    #[must_use]
    pub fn set(&self, tasks: Vec<Task>) -> Self {
        self.next(tasks)
    }

    /// Prepends a task, matching the newest-first order of the service.
    #[must_use]
    pub fn add(&self, task: Task) -> Self {
        let tasks = std::iter::once(task)
            .chain(self.tasks.iter().cloned())
            .collect();
        self.next(tasks)
    }

    /// Merges `patch` into the task with the given id, keeping its position.
    ///
    /// Other tasks are left as they are; an unknown id changes nothing but
    /// the version.
    #[must_use]
    pub fn update(&self, id: TaskId, patch: &TaskPatch) -> Self {
        let tasks = self
            .tasks
            .iter()
            .map(|task| {
                if task.id == id {
                    task.clone().apply(patch)
                } else {
                    task.clone()
                }
            })
            .collect();
        self.next(tasks)
    }

    /// Removes the task with the given id.
    #[must_use]
    pub fn remove(&self, id: TaskId) -> Self {
        let tasks = self
            .tasks
            .iter()
            .filter(|task| task.id != id)
            .cloned()
            .collect();
        self.next(tasks)
    }

    /// Empties the list.
    #[must_use]
    pub fn clear(&self) -> Self {
        self.next(Vec::new())
    }

    /// Splits the list into active and completed groups.
    #[must_use]
    pub fn partition(&self) -> TaskBoard {
        let (completed, active) = self.tasks.iter().cloned().partition(|task| task.completed);
        TaskBoard { active, completed }
    }

    /// Returns the tasks passing `filter`, in service order.
    #[must_use]
    pub fn filter(&self, filter: StatusFilter) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect()
    }
}

// =============================================================================
// Task Store
// =============================================================================

/// Single owned container for the current [`TaskSnapshot`].
#[derive(Debug, Default)]
pub struct TaskStore {
    current: ArcSwap<TaskSnapshot>,
}

impl TaskStore {
    /// Creates an empty store at version 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<TaskSnapshot> {
        self.current.load_full()
    }

    /// Replaces the current snapshot with `action(current)` and returns it.
    ///
    /// `action` may run more than once under contention, so it must be pure.
    pub fn apply(&self, action: impl Fn(&TaskSnapshot) -> TaskSnapshot) -> Arc<TaskSnapshot> {
        let mut applied = None;
        self.current.rcu(|current| {
            let next = Arc::new(action(&**current));
            applied = Some(Arc::clone(&next));
            next
        });
        applied.unwrap_or_else(|| self.snapshot())
    }

    /// Makes `snapshot` current again. The previous value is discarded as is.
    pub fn restore(&self, snapshot: Arc<TaskSnapshot>) {
        self.current.store(snapshot);
    }

    /// Replaces the whole list.
    pub fn set(&self, tasks: Vec<Task>) -> Arc<TaskSnapshot> {
        self.apply(|snapshot| snapshot.set(tasks.clone()))
    }

    /// Prepends a task.
    pub fn add(&self, task: &Task) -> Arc<TaskSnapshot> {
        self.apply(|snapshot| snapshot.add(task.clone()))
    }

    /// Merges `patch` into the task with the given id.
    pub fn update(&self, id: TaskId, patch: &TaskPatch) -> Arc<TaskSnapshot> {
        self.apply(|snapshot| snapshot.update(id, patch))
    }

    /// Removes the task with the given id.
    pub fn remove(&self, id: TaskId) -> Arc<TaskSnapshot> {
        self.apply(|snapshot| snapshot.remove(id))
    }

    /// Empties the list.
    pub fn clear(&self) -> Arc<TaskSnapshot> {
        self.apply(TaskSnapshot::clear)
    }
}

// =============================================================================
// Tests
// =============================================================================
