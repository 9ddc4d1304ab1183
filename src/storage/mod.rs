//! Storage backend.
//!
//! This module provides:
//! - `SQLite` database implementation
//! - Category, user, product and order CRUD operations
//! - Query plan inspection
//!
//! # Architecture
//!
//! The storage layer uses `SQLite` with the `sqlx` crate for async operations.
//! Every statement runs through a single timing hook, so a handle bound to an
//! [`ObservationScope`](crate::diagnostics::ObservationScope) sees exactly
//! what the database was asked to do.
//!
//! The implementation is split across submodules:
//! - `core`: Pool management, migrations, and the timing hook
//! - `category`: Category tree operations
//! - `user`: User operations
//! - `product`: Product operations
//! - `order`: Order and order item operations
//! - `explain`: `EXPLAIN QUERY PLAN` helpers
//!
//! # Example
//!
//! ```ignore
//! use shop_diagnostics::storage::ShopStorage;
//!
//! let storage = ShopStorage::new("./data/shop.db").await?;
//! let (electronics, _) = storage.get_or_create_category("Electronics", None).await?;
//! ```

mod category;
pub(crate) mod core;
mod explain;
mod order;
mod product;
mod types;
mod user;

pub use self::core::ShopStorage;
pub use explain::{inline_params, render_plan, PlanRow};
pub use types::{
    cents_to_price, hash_password, order_total, price_to_cents, Category, NewProduct, NewUser,
    Order, OrderItem, OrderStatus, Product, User,
};
