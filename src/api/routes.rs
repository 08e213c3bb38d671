//! Route configuration for the task API.
//!
//! # Routes
//!
//! | Method | Path | Handler | Description |
//! |--------|------|---------|-------------|
//! | GET | /tasks | `list_tasks` | List every task, newest first |
//! | POST | /tasks | `create_task` | Create a task |
//! | PATCH | /tasks/{id} | `update_task` | Partially update a task |
//! | DELETE | /tasks/{id} | `delete_task` | Delete a task |
//! | GET | /health | `health_check` | Health check endpoint |

use axum::Router;
use axum::routing::{get, patch};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_task, delete_task, health_check, list_tasks, update_task,
};

/// Creates the router with all API routes, request tracing and permissive CORS.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", patch(update_task).delete(delete_task))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
