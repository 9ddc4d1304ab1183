//! Integration tests for Shop Diagnostics.
//!
//! These tests verify end-to-end workflows including:
//! - Deterministic, top-up seeding
//! - Route dispatch under request diagnostics
//! - Statement recording across units of work
//! - Cascading deletes and order total stability

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod diagnostics_workflow;
mod referential_integrity;
mod request_workflow;
mod seed_workflow;

use shop_diagnostics::storage::ShopStorage;
use tempfile::TempDir;

/// Create a test database in a temporary directory.
pub async fn create_test_storage() -> (ShopStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let storage = ShopStorage::new(&db_path)
        .await
        .expect("Failed to create storage");
    (storage, temp_dir)
}
