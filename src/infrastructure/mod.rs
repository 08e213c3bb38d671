//! Infrastructure layer: persistence and configuration.
//!
//! - [`TaskRepository`]: the persistence seam used by the service
//! - [`InMemoryTaskRepository`] and [`PostgresTaskRepository`]: its backends
//! - [`RepositoryFactory`]: picks a backend from `STORAGE_MODE`
//! - [`ServerConfig`]: HTTP bind settings

pub mod config;
pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use config::{ConfigurationError, ServerConfig};
pub use factory::{
    FactoryError, Repositories, RepositoryConfig, RepositoryConfigBuilder, RepositoryFactory,
    StorageMode,
};
pub use in_memory::InMemoryTaskRepository;
pub use postgres::PostgresTaskRepository;
pub use repository::{RepositoryError, TaskRepository};
