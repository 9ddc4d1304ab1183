//! Request workflow tests.
//!
//! Seeds a small store, then dispatches every read route under request
//! diagnostics and checks the responses and SQL reports.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::create_test_storage;
use serial_test::serial;
use shop_diagnostics::catalog::Catalog;
use shop_diagnostics::diagnostics::{DiagnosticsConfig, RequestDiagnostics};
use shop_diagnostics::error::RequestError;
use shop_diagnostics::seed::{SeedPlan, Seeder};
use shop_diagnostics::storage::ShopStorage;
use tempfile::TempDir;

async fn seeded_storage() -> (ShopStorage, TempDir) {
    let (storage, temp_dir) = create_test_storage().await;
    Seeder::new(storage.clone(), 42)
        .run(&SeedPlan {
            users: 6,
            products: 15,
            orders: 8,
        })
        .await
        .unwrap();
    (storage, temp_dir)
}

fn debug_diagnostics() -> RequestDiagnostics {
    RequestDiagnostics::new(DiagnosticsConfig::default().with_enabled(true))
}

#[tokio::test]
#[serial]
async fn test_every_route_responds() {
    let (storage, _temp_dir) = seeded_storage().await;
    let catalog = Catalog::default();
    let diagnostics = debug_diagnostics();

    let product = storage.list_products().await.unwrap().remove(0);
    let order = storage.list_orders(None).await.unwrap().remove(0);
    let paths = [
        "/products/".to_string(),
        format!("/products/{}/", product.id),
        "/products/recent/".to_string(),
        "/orders/".to_string(),
        format!("/orders/{}/", order.id),
        "/orders/dashboard/".to_string(),
        "/orders/dashboard/?status=pending".to_string(),
        format!("/categories/{}/products/", product.category_id),
    ];

    for path in &paths {
        let (body, report) = catalog.handle_request(&diagnostics, &storage, path).await;
        assert!(body.is_ok(), "{path} failed: {body:?}");
        let report = report.unwrap_or_else(|| panic!("{path} produced no report"));
        assert!(report.contains(&format!("REQUEST: GET {path}")));
        assert!(report.contains("Total Queries:"));
    }
}

#[tokio::test]
#[serial]
async fn test_product_list_exposes_n_plus_one() {
    let (storage, _temp_dir) = seeded_storage().await;

    let (body, report) = Catalog::default()
        .handle_request(&debug_diagnostics(), &storage, "/products/")
        .await;

    assert_eq!(body.unwrap()["products"].as_array().unwrap().len(), 15);
    let report = report.unwrap();
    assert!(report.contains("Total Queries: 31"));
    assert!(report.contains("DUPLICATE QUERIES DETECTED: 2"));
    assert!(report.contains("[15x]"));
}

#[tokio::test]
#[serial]
async fn test_disabled_diagnostics_is_silent() {
    let (storage, _temp_dir) = seeded_storage().await;

    let (body, report) = Catalog::default()
        .handle_request(&RequestDiagnostics::default(), &storage, "/orders/")
        .await;

    assert_eq!(body.unwrap()["orders"].as_array().unwrap().len(), 8);
    assert!(report.is_none());
}

#[tokio::test]
#[serial]
async fn test_missing_order_is_client_error() {
    let (storage, _temp_dir) = seeded_storage().await;

    let (body, report) = Catalog::default()
        .handle_request(&debug_diagnostics(), &storage, "/orders/100000/")
        .await;

    let err = body.unwrap_err();
    assert_eq!(
        err,
        RequestError::NotFound {
            entity: "order",
            id: 100_000
        }
    );
    assert!(err.is_client_error());
    assert!(report.unwrap().contains("Total Queries: 1"));
}

#[tokio::test]
#[serial]
async fn test_explain_dashboard_by_status() {
    let (storage, _temp_dir) = seeded_storage().await;

    let explanation = Catalog::default()
        .explain_route(&storage, "/orders/dashboard/?status=shipped", false)
        .await
        .unwrap()
        .unwrap();

    assert!(explanation.statement.contains("WHERE status = ?"));
    assert_eq!(explanation.params, vec!["shipped".to_string()]);
    assert!(explanation.has_full_scan());
    assert!(explanation.render().contains("status = 'shipped'"));
}

#[tokio::test]
#[serial]
async fn test_explain_analyze_dashboard() {
    let (storage, _temp_dir) = seeded_storage().await;

    let explanation = Catalog::default()
        .explain_route(&storage, "/orders/dashboard/?status=pending", true)
        .await
        .unwrap()
        .unwrap();

    assert!(explanation.elapsed.is_some());
    assert!(explanation.render().contains("Execution time: "));
}
