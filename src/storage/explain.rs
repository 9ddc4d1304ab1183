//! Query plan inspection.

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::Row;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

use tracing::debug;

use super::core::ShopStorage;

/// One row of `EXPLAIN QUERY PLAN` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRow {
    /// Node id.
    pub id: i64,
    /// Parent node id, `0` for top-level nodes.
    pub parent: i64,
    /// Plan step, e.g. `SCAN products`.
    pub detail: String,
}

impl PlanRow {
    /// Whether this step reads a whole table without an index.
    #[must_use]
    pub fn is_full_scan(&self) -> bool {
        self.detail.starts_with("SCAN ") && !self.detail.contains(" USING ")
    }
}

impl ShopStorage {
    /// Ask `SQLite` how it would execute `statement`.
    ///
    /// Parameters are bound as text. The plan is not recorded in any
    /// observation scope.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QueryFailed`] if the statement cannot be
    /// prepared.
    pub async fn explain(
        &self,
        statement: &str,
        params: &[String],
    ) -> Result<Vec<PlanRow>, StorageError> {
        let sql = format!("EXPLAIN QUERY PLAN {statement}");
        let rows = bind_text(sqlx::query(&sql), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::query_error(statement, format!("{e}")))?;

        Ok(rows
            .iter()
            .map(|row| PlanRow {
                id: row.get("id"),
                parent: row.get("parent"),
                detail: row.get("detail"),
            })
            .collect())
    }

    /// Execute a read-only `statement` once and time it.
    ///
    /// Rows are fetched and discarded. Like [`ShopStorage::explain`], the run
    /// is not recorded in any observation scope.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QueryFailed`] if the statement is not a
    /// `SELECT` or fails to execute.
    pub async fn analyze(
        &self,
        statement: &str,
        params: &[String],
    ) -> Result<Duration, StorageError> {
        if !is_read_only(statement) {
            return Err(Self::query_error(
                statement,
                "only SELECT statements can be analyzed".to_string(),
            ));
        }

        let started = Instant::now();
        let rows = bind_text(sqlx::query(statement), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::query_error(statement, format!("{e}")))?;
        let elapsed = started.elapsed();

        debug!(rows = rows.len(), elapsed_us = elapsed.as_micros(), "Analyzed statement");
        Ok(elapsed)
    }
}

fn bind_text<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [String],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = if param == "NULL" {
            query.bind(None::<String>)
        } else {
            query.bind(param.as_str())
        };
    }
    query
}

fn is_read_only(statement: &str) -> bool {
    let head = statement.trim_start();
    ["SELECT", "WITH"].iter().any(|kw| {
        head.get(..kw.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(kw))
    })
}

/// Render plan rows as an indented tree.
#[must_use]
pub fn render_plan(rows: &[PlanRow]) -> String {
    let mut depth: HashMap<i64, usize> = HashMap::new();
    let mut out = String::from("QUERY PLAN\n");

    for row in rows {
        let level = depth.get(&row.parent).map_or(0, |d| d + 1);
        depth.insert(row.id, level);
        let _ = writeln!(out, "{}`--{}", "   ".repeat(level), row.detail);
    }

    out
}

/// Substitute `?` placeholders with their values for display.
///
/// Numeric values and `NULL` are inlined as-is; everything else is quoted.
/// Placeholders inside string literals are left alone.
#[must_use]
pub fn inline_params(statement: &str, params: &[String]) -> String {
    let mut out = String::with_capacity(statement.len());
    let mut params = params.iter();
    let mut in_literal = false;

    for ch in statement.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                out.push(ch);
            }
            '?' if !in_literal => match params.next() {
                Some(value) => out.push_str(&quote_param(value)),
                None => out.push(ch),
            },
            _ => out.push(ch),
        }
    }

    out
}

fn quote_param(value: &str) -> String {
    if value == "NULL" || is_numeric_literal(value) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// Digits with an optional sign, decimal point and exponent.
fn is_numeric_literal(value: &str) -> bool {
    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };

    let mut parts = mantissa.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) || whole.len() + fraction.len() == 0 {
        return false;
    }

    match exponent {
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && all_digits(digits)
        }
        None => true,
    }
}
