//! Query diagnostics.
//!
//! This module provides:
//! - [`StatementRecord`] and [`ObservationScope`]: the per-unit statement log
//! - [`summarize`]: count, total time, duplicate and slow statement detection
//! - [`Recorder`]: the `observe` combinator over a unit of work
//! - [`RequestDiagnostics`]: the per-request report, gated by configuration
//!
//! # Architecture
//!
//! There is no global statement log. A unit of work receives a
//! [`ShopStorage`](crate::storage::ShopStorage) handle bound to its own
//! scope, and every statement that handle executes is appended to that scope
//! in execution order.

mod record;
mod recorder;
mod request;
mod summary;

pub use record::{normalize_statement, ObservationScope, StatementRecord};
pub use recorder::{DiagnosticsConfig, Recorder};
pub use request::RequestDiagnostics;
pub use summary::{
    summarize, truncate_statement, DiagnosticsSummary, DuplicateStatement, DEFAULT_SLOW_THRESHOLD,
};
