//! Domain module for task management.
//!
//! This module contains the task entity and the value objects it is built from.

pub mod task;

pub use task::{FieldUpdate, Priority, Task, TaskId, TaskPatch, Timestamp, UnknownPriority};
