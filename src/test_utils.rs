//! Test utilities and fixtures.
//!
//! This module provides shared testing infrastructure:
//! - Mock factories for traits
//! - Small data fixtures on top of an in-memory store
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::storage::{Category, NewProduct, NewUser, Product, ShopStorage, User};
use crate::traits::MockTimeProvider;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a decimal literal.
///
/// # Panics
///
/// Panics if `value` is not a decimal.
#[must_use]
pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("Invalid decimal literal")
}

/// Create a mock time provider that always returns `time`.
#[must_use]
pub fn mock_time(time: DateTime<Utc>) -> MockTimeProvider {
    let mut mock = MockTimeProvider::new();
    mock.expect_now().return_const(time);
    mock
}

/// Create a user with the given name.
pub async fn create_test_user(storage: &ShopStorage, username: &str) -> User {
    storage
        .create_user(&NewUser::new(
            username,
            format!("{username}@example.com"),
            "testpass123",
        ))
        .await
        .expect("Failed to create user")
        .expect("Username already taken")
}

/// Create one user and one top-level category to hang products on.
pub async fn seed_owner_and_category(storage: &ShopStorage) -> (User, Category) {
    let owner = create_test_user(storage, "owner").await;
    let (category, _) = storage
        .get_or_create_category("Electronics", None)
        .await
        .expect("Failed to create category");
    (owner, category)
}

/// Create a product priced at `price`.
pub async fn create_test_product(
    storage: &ShopStorage,
    name: &str,
    price: &str,
    category_id: i64,
    owner_id: i64,
) -> Product {
    storage
        .create_product(&NewProduct::new(
            name,
            "Test product.",
            dec(price),
            category_id,
            owner_id,
        ))
        .await
        .expect("Failed to create product")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::core::tests::test_storage;
    use crate::traits::TimeProvider;

    #[test]
    fn test_dec() {
        assert_eq!(dec("25.50").to_string(), "25.50");
    }

    #[test]
    fn test_mock_time() {
        let now = Utc::now();
        assert_eq!(mock_time(now).now(), now);
    }

    #[tokio::test]
    async fn test_seed_owner_and_category() {
        let storage = test_storage().await;
        let (owner, category) = seed_owner_and_category(&storage).await;

        let product =
            create_test_product(&storage, "Widget", "9.99", category.id, owner.id).await;
        assert_eq!(product.price, dec("9.99"));
        assert_eq!(product.owner_id, owner.id);
    }
}
