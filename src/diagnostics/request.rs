//! Per-request SQL report.

use std::future::Future;

use super::recorder::{DiagnosticsConfig, Recorder};
use crate::storage::ShopStorage;

/// Wraps the handling of one request and logs its SQL report.
///
/// The report is produced only when the configuration is enabled and the
/// request executed at least one statement.
#[derive(Debug, Clone, Default)]
pub struct RequestDiagnostics {
    recorder: Recorder,
}

impl RequestDiagnostics {
    /// Create request diagnostics with the given settings.
    #[must_use]
    pub const fn new(config: DiagnosticsConfig) -> Self {
        Self {
            recorder: Recorder::new(config),
        }
    }

    /// Whether reports are emitted.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.recorder.config().enabled
    }

    /// Handle a request, logging its report when enabled.
    ///
    /// # Errors
    ///
    /// Returns the handler's error unchanged.
    pub async fn wrap<F, Fut, T, E>(
        &self,
        method: &str,
        path: &str,
        storage: &ShopStorage,
        handler: F,
    ) -> Result<T, E>
    where
        F: FnOnce(ShopStorage) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.wrap_with_report(method, path, storage, handler).await.0
    }

    /// Handle a request and also return the rendered report, if one was
    /// produced.
    pub async fn wrap_with_report<F, Fut, T, E>(
        &self,
        method: &str,
        path: &str,
        storage: &ShopStorage,
        handler: F,
    ) -> (Result<T, E>, Option<String>)
    where
        F: FnOnce(ShopStorage) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.enabled() {
            return (handler(storage.clone()).await, None);
        }

        let (result, summary) = self.recorder.observe(storage, handler).await;
        if summary.count == 0 {
            return (result, None);
        }

        let report = self
            .recorder
            .render(&format!("REQUEST: {method} {path}"), &summary);
        tracing::info!(
            method,
            path,
            queries = summary.count,
            duplicates = summary.duplicates.len(),
            slow = summary.slow.len(),
            "\n{report}"
        );
        (result, Some(report))
    }
}
