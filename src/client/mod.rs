//! Client side: the task gateway contract and the optimistic task cache.
//!
//! [`TaskCache`] mirrors the service's task list, applies mutations
//! speculatively and reconciles with the service afterwards. It reaches the
//! service through a [`TaskGateway`], either in-process ([`TaskService`]) or
//! over HTTP ([`HttpTaskGateway`]).
//!
//! [`TaskService`]: crate::service::TaskService

pub mod cache;
pub mod gateway;
pub mod http;
pub mod store;

pub use cache::{BusyFlags, BusyGuard, CacheView, MutationKind, RefreshOutcome, TaskCache};
pub use gateway::TaskGateway;
pub use http::HttpTaskGateway;
pub use store::{StatusFilter, TaskBoard, TaskSnapshot, TaskStore};
