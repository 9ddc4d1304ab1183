//! Storage types for database operations.
//!
//! This module defines the types stored in the database:
//! - [`Category`]: Category tree node
//! - [`User`]: Account owning products and orders
//! - [`Product`]: Catalog entry
//! - [`Order`] and [`OrderStatus`]: Customer orders
//! - [`OrderItem`]: Order line with the price captured at order time

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::StorageError;

/// Category stored in database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Row identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Parent category, `None` for top-level categories.
    pub parent_id: Option<i64>,
}

/// User stored in database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Row identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Whether this is a privileged account.
    pub is_superuser: bool,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
}

/// Values for a user insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Hex SHA-256 of the password.
    pub password_hash: String,
    /// Whether this is a privileged account.
    pub is_superuser: bool,
}

impl NewUser {
    /// A regular account.
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: hash_password(password),
            is_superuser: false,
        }
    }

    /// A privileged account.
    #[must_use]
    pub fn superuser(
        username: impl Into<String>,
        email: impl Into<String>,
        password: &str,
    ) -> Self {
        Self {
            is_superuser: true,
            ..Self::new(username, email, password)
        }
    }
}

/// Hex-encoded SHA-256 of a password.
#[must_use]
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Product stored in database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Row identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Current price.
    pub price: Decimal,
    /// Category the product is listed under.
    pub category_id: i64,
    /// User who created the product.
    pub owner_id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Values for a product insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Price, rounded to cents on insert.
    pub price: Decimal,
    /// Category the product is listed under.
    pub category_id: i64,
    /// User who created the product.
    pub owner_id: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewProduct {
    /// A product created now.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        category_id: i64,
        owner_id: i64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            category_id,
            owner_id,
            created_at: Utc::now(),
        }
    }

    /// Override the creation timestamp.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, not yet handled.
    #[default]
    Pending,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StorageError::Internal {
                message: format!("Unknown order status: {s}"),
            })
    }
}

/// Order stored in database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Row identifier.
    pub id: i64,
    /// User who placed the order.
    pub user_id: i64,
    /// Current status.
    pub status: OrderStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Order line stored in database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Row identifier.
    pub id: i64,
    /// Owning order.
    pub order_id: i64,
    /// Product ordered.
    pub product_id: i64,
    /// Units ordered, always positive.
    pub quantity: u32,
    /// Unit price at the time of the order.
    pub price: Decimal,
}

impl OrderItem {
    /// Price × quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Sum of item subtotals.
#[must_use]
pub fn order_total(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::subtotal).sum()
}

/// Decimal price → integer cents, rounding to two places.
///
/// # Errors
///
/// Returns [`StorageError::Internal`] if the price is negative or too large.
pub fn price_to_cents(price: Decimal) -> Result<i64, StorageError> {
    (price.round_dp(2) * Decimal::ONE_HUNDRED)
        .to_i64()
        .filter(|cents| *cents >= 0)
        .ok_or_else(|| StorageError::Internal {
            message: format!("Price out of range: {price}"),
        })
}

/// Integer cents → decimal price with two places.
#[must_use]
pub fn cents_to_price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
