//! Statement records and the observation scope that collects them.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// One statement executed by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRecord {
    /// Statement text as sent to the engine (placeholders, not values).
    pub statement: String,
    /// Bound parameters, rendered as text.
    pub params: Vec<String>,
    /// Time the engine took to execute the statement.
    pub elapsed: Duration,
}

impl StatementRecord {
    /// Create a new statement record.
    #[must_use]
    pub fn new(statement: impl Into<String>, params: Vec<String>, elapsed: Duration) -> Self {
        Self {
            statement: statement.into(),
            params,
            elapsed,
        }
    }

    /// Statement text with whitespace runs collapsed.
    #[must_use]
    pub fn normalized(&self) -> String {
        normalize_statement(&self.statement)
    }
}

/// Collapse whitespace runs to single spaces and trim.
///
/// Two executions of the same parameterized statement normalize to the same
/// text regardless of the values bound, which is what makes N+1 lookups
/// show up as duplicates.
#[must_use]
pub fn normalize_statement(statement: &str) -> String {
    statement.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Ordered statement log for one unit of work.
///
/// Cloning a scope yields another handle to the same log. Each observed unit
/// of work gets its own scope, so concurrent units never share records.
#[derive(Debug, Clone, Default)]
pub struct ObservationScope {
    records: Arc<Mutex<Vec<StatementRecord>>>,
}

impl ObservationScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, preserving execution order.
    pub fn push(&self, record: StatementRecord) {
        self.lock().push(record);
    }

    /// Discard every record collected so far.
    pub fn reset(&self) {
        self.lock().clear();
    }

    /// Copy of the log in execution order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<StatementRecord> {
        self.lock().clone()
    }

    /// Number of statements recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StatementRecord>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poison_error) => {
                tracing::warn!(
                    error = %poison_error,
                    "Statement log lock poisoned, using recovered data"
                );
                poison_error.into_inner()
            }
        }
    }
}
