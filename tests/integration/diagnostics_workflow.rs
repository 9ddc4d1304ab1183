//! Recorder workflow tests.
//!
//! Observes units of work against a file-backed store:
//! 1. Successful units (count, duplicates, wall time)
//! 2. Failing units (error kept, partial summary)
//! 3. Concurrent units (separate logs)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::create_test_storage;
use serial_test::serial;
use shop_diagnostics::diagnostics::{summarize, DiagnosticsConfig, Recorder};
use shop_diagnostics::error::StorageError;
use shop_diagnostics::storage::{NewUser, ShopStorage};
use std::time::Duration;

async fn add_users(storage: &ShopStorage, names: &[&str]) {
    for name in names {
        storage
            .create_user(&NewUser::new(*name, format!("{name}@example.com"), "pw"))
            .await
            .unwrap()
            .unwrap();
    }
}

#[tokio::test]
#[serial]
async fn test_observe_lookups_per_user() {
    let (storage, _temp_dir) = create_test_storage().await;
    add_users(&storage, &["a", "b", "c", "d"]).await;

    let (result, summary) = Recorder::default()
        .observe(&storage, |db| async move {
            let mut names = Vec::new();
            for user in db.list_users().await? {
                names.push(db.require_user(user.id).await?.username);
            }
            Ok::<_, StorageError>(names)
        })
        .await;

    assert_eq!(result.unwrap(), vec!["a", "b", "c", "d"]);
    assert_eq!(summary.count, 5);
    assert_eq!(summary.duplicates.len(), 1);
    assert_eq!(summary.duplicates[0].count, 4);
    assert!(summary.wall_time.unwrap() >= summary.total_time);
}

#[tokio::test]
#[serial]
async fn test_failing_unit_keeps_error_and_partial_log() {
    let (storage, _temp_dir) = create_test_storage().await;
    add_users(&storage, &["a"]).await;

    let (result, summary) = Recorder::default()
        .observe(&storage, |db| async move {
            db.count_users().await?;
            db.require_user(1).await?;
            db.require_user(999).await?;
            db.count_products().await
        })
        .await;

    assert_eq!(
        result.unwrap_err(),
        StorageError::NotFound {
            entity: "user",
            id: 999
        }
    );
    assert_eq!(summary.count, 3);
}

#[tokio::test]
#[serial]
async fn test_observe_and_report_propagates_error() {
    let (storage, _temp_dir) = create_test_storage().await;
    let recorder = Recorder::new(DiagnosticsConfig::default().with_enabled(true));

    let result = recorder
        .observe_and_report("delete missing", &storage, |db| async move {
            db.delete_order(12).await
        })
        .await;

    assert!(matches!(result, Err(StorageError::NotFound { .. })));
}

#[tokio::test]
#[serial]
async fn test_concurrent_observations_do_not_mix() {
    let (storage, _temp_dir) = create_test_storage().await;
    add_users(&storage, &["a"]).await;
    let recorder = Recorder::default();

    let ((_, one), (_, three)) = tokio::join!(
        recorder.observe(&storage, |db| async move { db.count_users().await }),
        recorder.observe(&storage, |db| async move {
            db.count_users().await?;
            db.count_products().await?;
            db.count_orders().await
        }),
    );

    assert_eq!(one.count, 1);
    assert_eq!(three.count, 3);
}

#[tokio::test]
#[serial]
async fn test_threshold_from_recorder_config() {
    let (storage, _temp_dir) = create_test_storage().await;
    let recorder = Recorder::new(DiagnosticsConfig {
        slow_threshold: Duration::ZERO,
        ..DiagnosticsConfig::default()
    });

    let (_, summary) = recorder
        .observe(&storage, |db| async move { db.list_users().await })
        .await;

    assert_eq!(summary.slow_threshold, Duration::ZERO);
    assert_eq!(summary.slow.len(), summary.count);
    assert_eq!(summarize(&summary.slow, Duration::MAX).slow.len(), 0);
}
