//! Referential integrity tests.
//!
//! Verifies cascading deletes and that order totals come from the prices
//! captured on the items, not from current product prices.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::create_test_storage;
use rust_decimal::Decimal;
use serial_test::serial;
use shop_diagnostics::storage::{NewProduct, NewUser, OrderStatus, ShopStorage};
use std::str::FromStr;

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

struct Fixture {
    user_id: i64,
    category_id: i64,
    product_ids: Vec<i64>,
    order_id: i64,
}

async fn fixture(storage: &ShopStorage) -> Fixture {
    let user = storage
        .create_user(&NewUser::new("buyer", "buyer@example.com", "pw"))
        .await
        .unwrap()
        .unwrap();
    let (category, _) = storage
        .get_or_create_category("Books", None)
        .await
        .unwrap();

    let mut product_ids = Vec::new();
    for (name, price) in [("novel", "10.00"), ("atlas", "5.50")] {
        let product = storage
            .create_product(&NewProduct::new(
                name,
                "",
                dec(price),
                category.id,
                user.id,
            ))
            .await
            .unwrap();
        product_ids.push(product.id);
    }

    let order = storage
        .create_order(user.id, OrderStatus::Pending)
        .await
        .unwrap();
    storage
        .add_order_item(order.id, product_ids[0], 2, dec("10.00"))
        .await
        .unwrap();
    storage
        .add_order_item(order.id, product_ids[1], 1, dec("5.50"))
        .await
        .unwrap();

    Fixture {
        user_id: user.id,
        category_id: category.id,
        product_ids,
        order_id: order.id,
    }
}

#[tokio::test]
#[serial]
async fn test_total_survives_price_changes() {
    let (storage, _temp_dir) = create_test_storage().await;
    let f = fixture(&storage).await;

    for id in &f.product_ids {
        storage.update_product_price(*id, dec("1.00")).await.unwrap();
    }

    assert_eq!(storage.order_total(f.order_id).await.unwrap(), dec("25.50"));
}

#[tokio::test]
#[serial]
async fn test_deleting_product_removes_its_items() {
    let (storage, _temp_dir) = create_test_storage().await;
    let f = fixture(&storage).await;

    storage.delete_product(f.product_ids[0]).await.unwrap();

    let items = storage.order_items(f.order_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(storage.order_total(f.order_id).await.unwrap(), dec("5.50"));
}

#[tokio::test]
#[serial]
async fn test_deleting_category_removes_products_and_items() {
    let (storage, _temp_dir) = create_test_storage().await;
    let f = fixture(&storage).await;

    storage.delete_category(f.category_id).await.unwrap();

    assert_eq!(storage.count_products().await.unwrap(), 0);
    assert!(storage.order_items(f.order_id).await.unwrap().is_empty());
    assert_eq!(storage.count_orders().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_deleting_user_removes_everything_they_own() {
    let (storage, _temp_dir) = create_test_storage().await;
    let f = fixture(&storage).await;

    storage.delete_user(f.user_id).await.unwrap();

    assert_eq!(storage.count_products().await.unwrap(), 0);
    assert_eq!(storage.count_orders().await.unwrap(), 0);
    assert!(storage.get_order(f.order_id).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_item_for_missing_product_is_rejected() {
    let (storage, _temp_dir) = create_test_storage().await;
    let f = fixture(&storage).await;

    assert!(storage
        .add_order_item(f.order_id, 9_999, 1, dec("1.00"))
        .await
        .is_err());
    assert_eq!(storage.order_items(f.order_id).await.unwrap().len(), 2);
}
