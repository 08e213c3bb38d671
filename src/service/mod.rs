//! Task service: request validation and the four task operations.

pub mod error;
pub mod input;
pub mod task_service;

pub use error::{FieldError, ServiceError, ValidationError};
pub use input::{
    CreateTaskRequest, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, NewTask, UpdateTaskRequest,
    parse_due_date, parse_task_id, validate_create_request, validate_description, validate_title,
    validate_update_request,
};
pub use task_service::TaskService;
