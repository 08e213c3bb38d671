//! HTTP surface of the task service.

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiErrorResponse, INTERNAL_ERROR, NOT_FOUND, VALIDATION_ERROR};
pub use handlers::{
    AppState, HealthResponse, create_task, delete_task, health_check, list_tasks, update_task,
};
pub use routes::create_router;
