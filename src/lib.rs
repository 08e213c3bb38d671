//! # taskdeck
//!
//! A personal task manager: a task CRUD service with an HTTP API, and a
//! client-side cache that applies mutations optimistically and reconciles
//! with the service afterwards.
//!
//! ## Layers
//!
//! - [`domain`]: the task entity and its partial-update types
//! - [`service`]: request validation and the list/create/update/delete operations
//! - [`infrastructure`]: repositories (in-memory and `PostgreSQL`) and configuration
//! - [`api`]: the axum router and error responses
//! - [`client`]: the task gateway contract and the optimistic [`client::TaskCache`]

pub mod api;
pub mod client;
pub mod domain;
pub mod infrastructure;
pub mod service;
