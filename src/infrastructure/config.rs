//! Configuration loaded from environment variables.
//!
//! `.env` files are honoured through `dotenvy`. Every loader takes a lookup
//! function so that parsing can be exercised without touching the process
//! environment.
//!
//! # Environment Variables
//!
//! - `HOST`: bind address (default `0.0.0.0`)
//! - `PORT`: bind port (default `3000`)
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default `5`)

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory' or 'postgres'")]
    InvalidStorageMode(String),

    /// Missing `DATABASE_URL` when storage mode is Postgres.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// Name of the environment variable.
        key: String,
        /// Why the value was rejected.
        message: String,
    },
}

/// Reads a variable from the process environment after loading `.env`.
pub fn environment_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Reads an optional variable, treating blank values as absent.
pub(crate) fn optional_value(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Reads an optional variable and parses it, falling back to `default`.
pub(crate) fn parsed_value<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigurationError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_value(lookup, key).map_or(Ok(default), |value| {
        value
            .parse()
            .map_err(|error: T::Err| ConfigurationError::InvalidValue {
                key: key.to_string(),
                message: format!("'{value}': {error}"),
            })
    })
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// Loads the server settings from the environment (and `.env`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` if `PORT` is not a valid port.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(environment_lookup)
    }

    /// Loads the server settings from an arbitrary lookup function.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` if `PORT` is not a valid port.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigurationError> {
        let defaults = Self::default();
        let host = optional_value(&lookup, "HOST").unwrap_or(defaults.host);
        let port = parsed_value(&lookup, "PORT", defaults.port)?;
        Ok(Self { host, port })
    }

    /// Returns the bind address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` if `HOST` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigurationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|error: std::net::AddrParseError| ConfigurationError::InvalidValue {
                key: "HOST".to_string(),
                message: format!("'{}': {error}", self.host),
            })
    }
}
