//! The observe combinator.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

use super::record::ObservationScope;
use super::summary::{summarize, DiagnosticsSummary, DEFAULT_SLOW_THRESHOLD};
use crate::storage::ShopStorage;

/// Diagnostics settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Whether request-flavor reports are emitted.
    pub enabled: bool,
    /// Statements slower than this are reported as slow.
    pub slow_threshold: Duration,
    /// Maximum duplicate/slow entries listed in a report.
    pub preview_limit: usize,
    /// Statement text width in a report.
    pub statement_width: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            slow_threshold: DEFAULT_SLOW_THRESHOLD,
            preview_limit: 3,
            statement_width: 100,
        }
    }
}

impl DiagnosticsConfig {
    /// Same settings with reporting switched on or off.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Runs units of work against a storage handle and summarizes the
/// statements they execute.
///
/// # Example
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use shop_diagnostics::diagnostics::Recorder;
/// use shop_diagnostics::storage::ShopStorage;
///
/// let storage = ShopStorage::new_in_memory().await.unwrap();
/// let recorder = Recorder::default();
///
/// let (result, summary) = recorder
///     .observe(&storage, |db| async move { db.count_products().await })
///     .await;
///
/// assert_eq!(result.unwrap(), 0);
/// assert_eq!(summary.count, 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    config: DiagnosticsConfig,
}

impl Recorder {
    /// Create a recorder with the given settings.
    #[must_use]
    pub const fn new(config: DiagnosticsConfig) -> Self {
        Self { config }
    }

    /// The recorder's settings.
    #[must_use]
    pub const fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// Start a new, empty statement log.
    #[must_use]
    pub fn begin_observation(&self) -> ObservationScope {
        ObservationScope::new()
    }

    /// Summarize whatever a scope has collected so far.
    #[must_use]
    pub fn summarize_scope(&self, scope: &ObservationScope) -> DiagnosticsSummary {
        summarize(&scope.snapshot(), self.config.slow_threshold)
    }

    /// Run `unit` with a storage handle bound to a fresh scope.
    ///
    /// The unit's result is returned untouched next to the summary. When the
    /// unit fails, the summary still covers every statement it ran before
    /// failing, including the failing one.
    pub async fn observe<F, Fut, T, E>(
        &self,
        storage: &ShopStorage,
        unit: F,
    ) -> (Result<T, E>, DiagnosticsSummary)
    where
        F: FnOnce(ShopStorage) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let scope = self.begin_observation();
        let bound = storage.observed(scope.clone());

        let started = Instant::now();
        let result = unit(bound).await;
        let wall_time = started.elapsed();

        let summary = self.summarize_scope(&scope).with_wall_time(wall_time);
        (result, summary)
    }

    /// Observe `unit`, log its report, then hand back its result.
    ///
    /// # Errors
    ///
    /// Returns whatever error `unit` returned, after the report is logged.
    pub async fn observe_and_report<F, Fut, T, E>(
        &self,
        label: &str,
        storage: &ShopStorage,
        unit: F,
    ) -> Result<T, E>
    where
        F: FnOnce(ShopStorage) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let (result, summary) = self.observe(storage, unit).await;
        tracing::info!(
            unit = label,
            queries = summary.count,
            duplicates = summary.duplicates.len(),
            slow = summary.slow.len(),
            failed = result.is_err(),
            "\n{}",
            self.render(label, &summary)
        );
        result
    }

    /// Render a summary with this recorder's preview settings.
    #[must_use]
    pub fn render(&self, label: &str, summary: &DiagnosticsSummary) -> String {
        summary.render(
            label,
            self.config.preview_limit,
            self.config.statement_width,
        )
    }
}
