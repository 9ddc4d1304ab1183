//! Statement log aggregation and the human-readable report.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;

use super::record::StatementRecord;

/// Default slow statement threshold (100 ms).
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_millis(100);

const SEPARATOR_WIDTH: usize = 60;

/// A statement that ran more than once in one unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateStatement {
    /// Normalized statement text.
    pub statement: String,
    /// How many times it ran.
    pub count: usize,
}

/// Aggregate view over one statement log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiagnosticsSummary {
    /// Number of statements executed.
    pub count: usize,
    /// Sum of per-statement elapsed times.
    pub total_time: Duration,
    /// Wall-clock time of the whole unit of work, when it was observed.
    pub wall_time: Option<Duration>,
    /// Statements executed more than once, in first-seen order.
    pub duplicates: Vec<DuplicateStatement>,
    /// Every record slower than the threshold, in execution order.
    pub slow: Vec<StatementRecord>,
    /// Threshold the slow list was computed with.
    pub slow_threshold: Duration,
}

/// Summarize a statement log.
///
/// Duplicates are grouped by normalized statement text. A record is slow
/// when its elapsed time strictly exceeds `slow_threshold`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use shop_diagnostics::diagnostics::{summarize, StatementRecord};
///
/// let log = vec![
///     StatementRecord::new("SELECT A", vec![], Duration::from_millis(10)),
///     StatementRecord::new("SELECT B", vec![], Duration::from_millis(150)),
///     StatementRecord::new("SELECT A", vec![], Duration::from_millis(20)),
/// ];
/// let summary = summarize(&log, Duration::from_millis(100));
///
/// assert_eq!(summary.count, 3);
/// assert_eq!(summary.total_time, Duration::from_millis(180));
/// assert_eq!(summary.duplicate_counts()["SELECT A"], 2);
/// assert_eq!(summary.slow.len(), 1);
/// ```
#[must_use]
pub fn summarize(log: &[StatementRecord], slow_threshold: Duration) -> DiagnosticsSummary {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in log {
        let key = record.normalized();
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    let duplicates = order
        .into_iter()
        .filter_map(|statement| {
            let count = counts.get(&statement).copied().unwrap_or(0);
            (count > 1).then_some(DuplicateStatement { statement, count })
        })
        .collect();

    DiagnosticsSummary {
        count: log.len(),
        total_time: log.iter().map(|r| r.elapsed).sum(),
        wall_time: None,
        duplicates,
        slow: log
            .iter()
            .filter(|r| r.elapsed > slow_threshold)
            .cloned()
            .collect(),
        slow_threshold,
    }
}

impl DiagnosticsSummary {
    /// Attach the wall-clock duration of the observed unit.
    #[must_use]
    pub const fn with_wall_time(mut self, wall_time: Duration) -> Self {
        self.wall_time = Some(wall_time);
        self
    }

    /// Duplicates as a statement → occurrences map.
    #[must_use]
    pub fn duplicate_counts(&self) -> HashMap<String, usize> {
        self.duplicates
            .iter()
            .map(|d| (d.statement.clone(), d.count))
            .collect()
    }

    /// Returns true if any duplicate or slow statement was found.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        !self.duplicates.is_empty() || !self.slow.is_empty()
    }

    /// Render the report block.
    ///
    /// Counts always reflect the full summary; only the listed entries are
    /// capped at `preview_limit` and their text at `width` characters.
    #[must_use]
    pub fn render(&self, label: &str, preview_limit: usize, width: usize) -> String {
        let rule = "=".repeat(SEPARATOR_WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{label}");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Total Queries: {}", self.count);
        let _ = writeln!(out, "Total Time: {:.3}s", self.total_time.as_secs_f64());
        if let Some(wall_time) = self.wall_time {
            let _ = writeln!(out, "Wall Time: {:.3}s", wall_time.as_secs_f64());
        }

        if !self.duplicates.is_empty() {
            let _ = writeln!(
                out,
                "\nDUPLICATE QUERIES DETECTED: {}",
                self.duplicates.len()
            );
            for duplicate in self.duplicates.iter().take(preview_limit) {
                let _ = writeln!(
                    out,
                    "  [{}x] {}",
                    duplicate.count,
                    truncate_statement(&duplicate.statement, width)
                );
            }
        }

        if !self.slow.is_empty() {
            let _ = writeln!(
                out,
                "\nSLOW QUERIES (>{}): {}",
                format_threshold(self.slow_threshold),
                self.slow.len()
            );
            for record in self.slow.iter().take(preview_limit) {
                let _ = writeln!(
                    out,
                    "  [{:.3}s] {}",
                    record.elapsed.as_secs_f64(),
                    truncate_statement(&record.normalized(), width)
                );
            }
        }

        let _ = writeln!(out, "{rule}");
        out
    }
}

/// Whole milliseconds as `ms`, anything finer as `µs`.
fn format_threshold(threshold: Duration) -> String {
    if threshold.subsec_nanos() % 1_000_000 == 0 {
        format!("{}ms", threshold.as_millis())
    } else {
        format!("{}µs", threshold.as_micros())
    }
}

/// Truncate to at most `width` characters, marking the cut with `...`.
#[must_use]
pub fn truncate_statement(statement: &str, width: usize) -> String {
    match statement.char_indices().nth(width) {
        Some((cut, _)) => format!("{}...", &statement[..cut]),
        None => statement.to_string(),
    }
}
