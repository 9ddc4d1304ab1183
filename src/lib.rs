//! Shop Diagnostics
//!
//! A small e-commerce store on `SQLite`, seeded with deterministic synthetic
//! data and instrumented so every statement a unit of work runs can be
//! counted, timed and grouped.
//!
//! # Features
//!
//! - Statement recorder with duplicate (N+1) and slow statement detection
//! - Per-request SQL reports for the read endpoints
//! - Deterministic, top-up seeding of categories, users, products and orders
//! - `EXPLAIN QUERY PLAN` inspection of the statement behind a route
//!
//! # Quick Start
//!
//! ```bash
//! shop-diagnostics seed --users 100 --products 1000 --orders 500
//! SHOP_DEBUG=true shop-diagnostics request /orders/dashboard/
//! shop-diagnostics explain --analyze /products/recent/
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   route    ┌─────────────────┐  observed handle  ┌─────────┐
//! │     CLI     │───────────▶│     Catalog     │──────────────────▶│ Storage │──▶ SQLite
//! └─────────────┘            └────────┬────────┘                   └────┬────┘
//!                                     │                                 │ StatementRecord
//!                                     ▼                                 ▼
//!                             RequestDiagnostics ◀──────────── ObservationScope
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod seed;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod test_utils;
