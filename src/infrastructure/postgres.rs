//! `PostgreSQL` task repository.
//!
//! Uses `sqlx` with a shared `PgPool`. Partial updates only write the columns
//! present in the patch, so concurrent edits of different fields of the same
//! row do not overwrite each other; edits of the same field are
//! last-write-wins.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS tasks (
//!     id UUID PRIMARY KEY,
//!     title TEXT NOT NULL,
//!     description TEXT NULL,
//!     completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     priority TEXT NOT NULL DEFAULT 'MEDIUM',
//!     due_date DATE NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     seq BIGSERIAL
//! );
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::{FieldUpdate, Task, TaskId, TaskPatch, Timestamp};
use crate::infrastructure::{RepositoryError, TaskRepository};

const CREATE_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS tasks (
    id UUID PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NULL,
    completed BOOLEAN NOT NULL DEFAULT FALSE,
    priority TEXT NOT NULL DEFAULT 'MEDIUM',
    due_date DATE NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    seq BIGSERIAL
)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks (created_at DESC, seq DESC)";

const TASK_COLUMNS: &str = "id, title, description, completed, priority, due_date, created_at";

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw row of the `tasks` table.
#[derive(Debug, FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    completed: bool,
    priority: String,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let priority = row
            .priority
            .parse()
            .map_err(|error: crate::domain::UnknownPriority| {
                RepositoryError::InvalidRow(format!("task {}: {error}", row.id))
            })?;

        Ok(Self {
            id: TaskId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            completed: row.completed,
            priority,
            due_date: row.due_date,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn database_error(error: &sqlx::Error) -> RepositoryError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Unavailable(error.to_string())
        }
        _ => RepositoryError::DatabaseError(error.to_string()),
    }
}

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` implementation of `TaskRepository`.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `tasks` table and its ordering index when missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|error| database_error(&error))?;
        sqlx::query(CREATE_INDEX)
            .execute(&self.pool)
            .await
            .map_err(|error| database_error(&error))?;
        Ok(())
    }
}

/// Builds the `UPDATE` statement for the columns present in `patch`.
///
/// Returns `None` for an empty patch.
fn build_update_query<'a>(id: Uuid, patch: &'a TaskPatch) -> Option<QueryBuilder<'a, Postgres>> {
    if patch.is_empty() {
        return None;
    }

    let mut builder = QueryBuilder::new("UPDATE tasks SET ");
    let mut assignments = builder.separated(", ");

    if let Some(title) = &patch.title {
        assignments.push("title = ").push_bind_unseparated(title.as_str());
    }
    match &patch.description {
        FieldUpdate::Unchanged => {}
        FieldUpdate::Set(description) => {
            assignments
                .push("description = ")
                .push_bind_unseparated(description.as_str());
        }
        FieldUpdate::Clear => {
            assignments.push("description = NULL");
        }
    }
    if let Some(completed) = patch.completed {
        assignments.push("completed = ").push_bind_unseparated(completed);
    }
    if let Some(priority) = patch.priority {
        assignments
            .push("priority = ")
            .push_bind_unseparated(priority.as_str());
    }
    match &patch.due_date {
        FieldUpdate::Unchanged => {}
        FieldUpdate::Set(due_date) => {
            assignments.push("due_date = ").push_bind_unseparated(*due_date);
        }
        FieldUpdate::Clear => {
            assignments.push("due_date = NULL");
        }
    }

    builder.push(" WHERE id = ").push_bind(id);
    builder.push(" RETURNING ").push(TASK_COLUMNS);
    Some(builder)
}

impl TaskRepository for PostgresTaskRepository {
    fn list(&self) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<TaskRow> = sqlx::query_as(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, seq DESC"
            ))
            .fetch_all(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            rows.into_iter().map(Task::try_from).collect()
        }
        .boxed()
    }

    fn insert(&self, task: &Task) -> BoxFuture<'static, Result<Task, RepositoryError>> {
        let pool = self.pool.clone();
        let task = task.clone();
        async move {
            let row: TaskRow = sqlx::query_as(&format!(
                "INSERT INTO tasks (id, title, description, completed, priority, due_date, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {TASK_COLUMNS}"
            ))
            .bind(task.id.as_uuid())
            .bind(&task.title)
            .bind(task.description.as_deref())
            .bind(task.completed)
            .bind(task.priority.as_str())
            .bind(task.due_date)
            .bind(task.created_at.as_datetime())
            .fetch_one(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            Task::try_from(row)
        }
        .boxed()
    }

    fn update(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();
        let patch = patch.clone();
        async move {
            let row: Option<TaskRow> = match build_update_query(id, &patch) {
                Some(mut builder) => builder
                    .build_query_as()
                    .fetch_optional(&pool)
                    .await
                    .map_err(|error| database_error(&error))?,
                None => sqlx::query_as(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
                ))
                .bind(id)
                .fetch_optional(&pool)
                .await
                .map_err(|error| database_error(&error))?,
            };

            row.map(Task::try_from).transpose()
        }
        .boxed()
    }

    fn delete(&self, id: &TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        let pool = self.pool.clone();
        let id = *id.as_uuid();
        async move {
            let row: Option<TaskRow> = sqlx::query_as(&format!(
                "DELETE FROM tasks WHERE id = $1 RETURNING {TASK_COLUMNS}"
            ))
            .bind(id)
            .fetch_optional(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            row.map(Task::try_from).transpose()
        }
        .boxed()
    }
}
