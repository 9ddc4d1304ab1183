//! Core `SQLite` storage implementation.
//!
//! This module provides the main [`ShopStorage`] struct, migrations and the
//! timing hook every statement goes through.

#![allow(clippy::missing_errors_doc)]

use crate::diagnostics::{ObservationScope, StatementRecord};
use crate::error::StorageError;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

/// `SQLite` storage backend for the shop.
///
/// Cloning is cheap; clones share the connection pool. A handle returned by
/// [`ShopStorage::observed`] additionally appends every statement it runs
/// to an [`ObservationScope`].
#[derive(Debug, Clone)]
pub struct ShopStorage {
    pub(crate) pool: SqlitePool,
    scope: Option<ObservationScope>,
}

impl ShopStorage {
    /// Get a clone of the connection pool.
    #[must_use]
    pub fn get_pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    /// Create a new `SQLite` storage instance.
    ///
    /// # Arguments
    ///
    /// * `database_path` - Path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConnectionFailed`] if the connection fails.
    pub async fn new(database_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = database_path.as_ref();

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::ConnectionFailed {
                message: format!("Failed to create database directory: {e}"),
            })?;
        }

        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", path.display()))
                .map_err(|e| StorageError::ConnectionFailed {
                    message: format!("Invalid database path: {e}"),
                })?
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true)
                .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed {
                message: format!("Failed to connect to database: {e}"),
            })?;

        let storage = Self { pool, scope: None };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Create a new in-memory `SQLite` storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ConnectionFailed`] if the connection fails.
    pub async fn new_in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::ConnectionFailed {
                message: format!("Invalid memory database options: {e}"),
            })?
            .foreign_keys(true);

        // A single connection that never expires keeps the in-memory database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed {
                message: format!("Failed to create in-memory database: {e}"),
            })?;

        let storage = Self { pool, scope: None };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// A handle on the same pool that records into `scope`.
    #[must_use]
    pub fn observed(&self, scope: ObservationScope) -> Self {
        Self {
            pool: self.pool.clone(),
            scope: Some(scope),
        }
    }

    /// The scope this handle records into, if any.
    #[must_use]
    pub const fn scope(&self) -> Option<&ObservationScope> {
        self.scope.as_ref()
    }

    /// Run database migrations.
    ///
    /// Each migration is idempotent (uses IF NOT EXISTS).
    pub(crate) async fn run_migrations(&self) -> Result<(), StorageError> {
        // Migration 001: Initial schema
        let schema_001 = include_str!("../../migrations/001_initial_schema.sql");
        sqlx::query(schema_001)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::MigrationFailed {
                version: "001".to_string(),
                message: format!("Failed to run migration 001: {e}"),
            })?;

        Ok(())
    }

    /// Execute one statement, timing it and recording it in the bound scope.
    ///
    /// Failed executions are recorded too, so a unit of work that fails
    /// mid-way still accounts for the statement that failed.
    pub(crate) async fn timed<T, Fut>(
        &self,
        statement: &str,
        params: Vec<String>,
        execution: Fut,
    ) -> Result<T, StorageError>
    where
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        let started = Instant::now();
        let result = execution.await;
        let elapsed = started.elapsed();

        if let Some(scope) = &self.scope {
            scope.push(StatementRecord::new(statement, params, elapsed));
        }

        result.map_err(|e| {
            tracing::warn!(statement, error = %e, "Statement failed");
            Self::query_error(statement, format!("{e}"))
        })
    }

    /// Format a timestamp for storage.
    ///
    /// Fixed precision and a `Z` suffix keep stored timestamps comparable as
    /// text.
    pub(crate) fn format_datetime(dt: DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Parse a datetime string from the database.
    pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StorageError> {
        s.parse::<DateTime<Utc>>()
            .map_err(|e| StorageError::Internal {
                message: format!("Failed to parse datetime '{s}': {e}"),
            })
    }

    /// Create a query error with the given query name and message.
    pub(crate) fn query_error(query: &str, message: String) -> StorageError {
        StorageError::QueryFailed {
            query: query.to_string(),
            message,
        }
    }
}

/// Render a nullable id parameter for the statement log.
pub(crate) fn optional_param(value: Option<i64>) -> String {
    value.map_or_else(|| "NULL".to_string(), |v| v.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
pub mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use serial_test::serial;

    pub async fn test_storage() -> ShopStorage {
        ShopStorage::new_in_memory()
            .await
            .expect("Failed to create test storage")
    }

    #[tokio::test]
    async fn test_new_in_memory() {
        let storage = ShopStorage::new_in_memory().await;
        assert!(storage.is_ok());
    }

    #[tokio::test]
    #[serial]
    async fn test_new_with_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("shop.db");

        let storage = ShopStorage::new(&db_path).await;
        assert!(storage.is_ok());
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let storage = test_storage().await;
        assert!(storage.run_migrations().await.is_ok());
    }

    #[tokio::test]
    async fn test_timed_records_into_scope() {
        let storage = test_storage().await;
        let scope = ObservationScope::new();
        let observed = storage.observed(scope.clone());

        let value: i64 = observed
            .timed(
                "SELECT 1",
                vec![],
                sqlx::query_scalar("SELECT 1").fetch_one(&observed.pool),
            )
            .await
            .unwrap();

        assert_eq!(value, 1);
        let log = scope.snapshot();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].statement, "SELECT 1");
    }

    #[tokio::test]
    async fn test_timed_records_failures() {
        let storage = test_storage().await;
        let scope = ObservationScope::new();
        let observed = storage.observed(scope.clone());

        let result: Result<i64, _> = observed
            .timed(
                "SELECT nope FROM missing_table",
                vec![],
                sqlx::query_scalar("SELECT nope FROM missing_table").fetch_one(&observed.pool),
            )
            .await;

        assert!(matches!(result, Err(StorageError::QueryFailed { .. })));
        assert_eq!(scope.len(), 1);
    }

    #[tokio::test]
    async fn test_unobserved_handle_has_no_scope() {
        let storage = test_storage().await;
        assert!(storage.scope().is_none());
        assert!(storage.observed(ObservationScope::new()).scope().is_some());
    }

    #[test]
    fn test_datetime_round_trip() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let stored = ShopStorage::format_datetime(dt);

        assert_eq!(stored, "2024-01-15T10:30:00.000000Z");
        let parsed = ShopStorage::parse_datetime(&stored).unwrap();
        assert_eq!(parsed, dt);
        assert_eq!(parsed.year(), 2024);
    }

    #[test]
    fn test_stored_datetimes_sort_as_text() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();

        assert!(ShopStorage::format_datetime(earlier) < ShopStorage::format_datetime(later));
    }

    #[test]
    fn test_parse_datetime_invalid() {
        match ShopStorage::parse_datetime("not-a-datetime") {
            Err(StorageError::Internal { message }) => {
                assert!(message.contains("Failed to parse datetime"));
            }
            other => panic!("Expected Internal error, got {other:?}"),
        }
    }

    #[test]
    fn test_query_error() {
        let err = ShopStorage::query_error("SELECT * FROM foo", "some db error".to_string());
        assert_eq!(
            err,
            StorageError::QueryFailed {
                query: "SELECT * FROM foo".to_string(),
                message: "some db error".to_string(),
            }
        );
    }

    #[test]
    fn test_optional_param() {
        assert_eq!(optional_param(None), "NULL");
        assert_eq!(optional_param(Some(4)), "4");
    }
}
