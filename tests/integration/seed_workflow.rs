//! Seeding workflow tests.
//!
//! Tests the full seeding run:
//! 1. Seed an empty store
//! 2. Re-run with the same plan (nothing created)
//! 3. Raise targets (only the difference created)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::create_test_storage;
use shop_diagnostics::seed::{SeedPlan, SeedReport, Seeder, ADMIN_USERNAME};
use shop_diagnostics::storage::order_total;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_seed_then_rerun_is_idempotent() {
    let (storage, _temp_dir) = create_test_storage().await;
    let plan = SeedPlan {
        users: 10,
        products: 30,
        orders: 15,
    };

    let first = Seeder::new(storage.clone(), 42).run(&plan).await.unwrap();
    assert_eq!(first.categories_created, 28);
    assert_eq!(first.users_created, 10);
    assert_eq!(first.products_created, 30);
    assert_eq!(first.orders_created, 15);

    // a different seed on the second run must not matter
    let second = Seeder::new(storage.clone(), 7).run(&plan).await.unwrap();
    assert_eq!(second, SeedReport::default());

    assert_eq!(storage.count_categories().await.unwrap(), 28);
    assert_eq!(storage.count_users().await.unwrap(), 10);
    assert_eq!(storage.count_products().await.unwrap(), 30);
    assert_eq!(storage.count_orders().await.unwrap(), 15);
}

#[tokio::test]
#[serial]
async fn test_top_up_creates_only_the_deficit() {
    let (storage, _temp_dir) = create_test_storage().await;
    let mut seeder = Seeder::new(storage.clone(), 1);

    seeder
        .run(&SeedPlan {
            users: 20,
            products: 5,
            orders: 0,
        })
        .await
        .unwrap();

    let report = seeder
        .run(&SeedPlan {
            users: 30,
            products: 5,
            orders: 2,
        })
        .await
        .unwrap();

    assert_eq!(report.users_created, 10);
    assert_eq!(report.products_created, 0);
    assert_eq!(report.orders_created, 2);
    assert_eq!(storage.count_users().await.unwrap(), 30);
}

#[tokio::test]
#[serial]
async fn test_admin_is_created_once() {
    let (storage, _temp_dir) = create_test_storage().await;
    let mut seeder = Seeder::new(storage.clone(), 3);

    seeder.seed_users(1).await.unwrap();
    seeder.seed_users(3).await.unwrap();

    let admins: Vec<_> = storage
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.is_superuser)
        .collect();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].username, ADMIN_USERNAME);
    assert_eq!(admins[0].email, "admin@example.com");
}

#[tokio::test]
#[serial]
async fn test_seeded_orders_are_consistent() {
    let (storage, _temp_dir) = create_test_storage().await;
    Seeder::new(storage.clone(), 42)
        .run(&SeedPlan {
            users: 5,
            products: 12,
            orders: 10,
        })
        .await
        .unwrap();

    for order in storage.list_orders(None).await.unwrap() {
        let items = storage.order_items(order.id).await.unwrap();
        assert!((1..=8).contains(&items.len()));
        assert_eq!(
            storage.order_total(order.id).await.unwrap(),
            order_total(&items)
        );
        for item in &items {
            let product = storage.require_product(item.product_id).await.unwrap();
            assert_eq!(item.price, product.price);
        }
    }
}
