//! Error types for the shop diagnostics sandbox.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`StorageError`]: Database operation errors
//! - [`SeedError`]: Data generation errors
//! - [`RequestError`]: Read-surface routing and lookup errors
//! - [`ConfigError`]: Configuration errors
//!
//! All errors implement `Send + Sync` for async compatibility.

use thiserror::Error;

/// Top-level application error.
///
/// This is the main error type returned by the binary's command handlers.
/// It wraps all subsystem errors for unified error handling.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Seeding error.
    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Storage errors.
///
/// These errors represent failures in database operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Failed to connect to the database.
    #[error("Database connection failed: {message}")]
    ConnectionFailed {
        /// Description of the connection failure.
        message: String,
    },

    /// The store rejected a statement.
    #[error("Query failed: {query} - {message}")]
    QueryFailed {
        /// The query that failed (may be truncated).
        query: String,
        /// Description of the failure.
        message: String,
    },

    /// A lookup by identifier found nothing.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind (category, product, order, user).
        entity: &'static str,
        /// The identifier that was looked up.
        id: i64,
    },

    /// Database migration failed.
    #[error("Migration failed: {version} - {message}")]
    MigrationFailed {
        /// The migration version that failed.
        version: String,
        /// Description of the failure.
        message: String,
    },

    /// Internal storage error.
    #[error("Internal storage error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

/// Seeding errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeedError {
    /// A create or lookup failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Every generated username collided with an existing one.
    #[error("Could not generate a free username after {attempts} attempts")]
    UsernameExhausted {
        /// Number of attempts made.
        attempts: u32,
    },

    /// A stage needs at least one row of a prerequisite entity.
    #[error("Cannot seed {stage}: no {entity} available")]
    EmptyPool {
        /// The stage being seeded.
        stage: &'static str,
        /// The missing prerequisite.
        entity: &'static str,
    },
}

/// Read-surface errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No route matches the path.
    #[error("No route for path: {path}")]
    UnknownRoute {
        /// The path that was requested.
        path: String,
    },

    /// A path or query parameter is malformed.
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// The requested entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// The identifier that was looked up.
        id: i64,
    },

    /// The store failed while serving the request.
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for RequestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Storage(other),
        }
    }
}

impl RequestError {
    /// Returns true if the caller asked for something that does not exist.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownRoute { .. } | Self::InvalidParameter { .. } | Self::NotFound { .. }
        )
    }
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}
