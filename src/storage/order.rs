//! Order and order item storage operations.

#![allow(clippy::missing_errors_doc)]

use crate::error::StorageError;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::core::ShopStorage;
use super::types::{cents_to_price, price_to_cents, Order, OrderItem, OrderStatus};

const INSERT_ORDER: &str =
    "INSERT INTO orders (user_id, status, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING id";
const SELECT_BY_ID: &str =
    "SELECT id, user_id, status, created_at, updated_at FROM orders WHERE id = ?";
const SELECT_RECENT: &str = "SELECT id, user_id, status, created_at, updated_at FROM orders \
     ORDER BY created_at DESC, id DESC LIMIT ?";
const SELECT_ALL: &str =
    "SELECT id, user_id, status, created_at, updated_at FROM orders ORDER BY id";
const SELECT_BY_STATUS: &str =
    "SELECT id, user_id, status, created_at, updated_at FROM orders WHERE status = ? ORDER BY id";
const UPDATE_STATUS: &str = "UPDATE orders SET status = ?, updated_at = ? WHERE id = ?";
const COUNT_ALL: &str = "SELECT COUNT(*) FROM orders";
const DELETE_BY_ID: &str = "DELETE FROM orders WHERE id = ?";

const INSERT_ITEM: &str = "INSERT INTO order_items (order_id, product_id, quantity, price_cents) \
     VALUES (?, ?, ?, ?) RETURNING id";
const SELECT_ITEMS: &str = "SELECT id, order_id, product_id, quantity, price_cents \
     FROM order_items WHERE order_id = ? ORDER BY id";
const SUM_ITEMS: &str =
    "SELECT COALESCE(SUM(price_cents * quantity), 0) FROM order_items WHERE order_id = ?";

fn order_from_row(row: &SqliteRow) -> Result<Order, StorageError> {
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    Ok(Order {
        id: row.get("id"),
        user_id: row.get("user_id"),
        status: status.parse()?,
        created_at: ShopStorage::parse_datetime(&created_at)?,
        updated_at: ShopStorage::parse_datetime(&updated_at)?,
    })
}

fn item_from_row(row: &SqliteRow) -> Result<OrderItem, StorageError> {
    let quantity: i64 = row.get("quantity");
    Ok(OrderItem {
        id: row.get("id"),
        order_id: row.get("order_id"),
        product_id: row.get("product_id"),
        quantity: u32::try_from(quantity).map_err(|_| StorageError::Internal {
            message: format!("Invalid stored quantity: {quantity}"),
        })?,
        price: cents_to_price(row.get("price_cents")),
    })
}

impl ShopStorage {
    /// Create an order with no items.
    pub async fn create_order(
        &self,
        user_id: i64,
        status: OrderStatus,
    ) -> Result<Order, StorageError> {
        let now = Utc::now();
        let now_str = Self::format_datetime(now);

        let id: i64 = self
            .timed(
                INSERT_ORDER,
                vec![
                    user_id.to_string(),
                    status.to_string(),
                    now_str.clone(),
                    now_str.clone(),
                ],
                sqlx::query_scalar(INSERT_ORDER)
                    .bind(user_id)
                    .bind(status.as_str())
                    .bind(&now_str)
                    .bind(&now_str)
                    .fetch_one(&self.pool),
            )
            .await?;

        let created_at = Self::parse_datetime(&now_str)?;
        Ok(Order {
            id,
            user_id,
            status,
            created_at,
            updated_at: created_at,
        })
    }

    /// Add a line to an order.
    ///
    /// `price` is the unit price at the time of the order; it is stored as
    /// given and never changes afterwards.
    pub async fn add_order_item(
        &self,
        order_id: i64,
        product_id: i64,
        quantity: u32,
        price: Decimal,
    ) -> Result<OrderItem, StorageError> {
        let price_cents = price_to_cents(price)?;

        let id: i64 = self
            .timed(
                INSERT_ITEM,
                vec![
                    order_id.to_string(),
                    product_id.to_string(),
                    quantity.to_string(),
                    price_cents.to_string(),
                ],
                sqlx::query_scalar(INSERT_ITEM)
                    .bind(order_id)
                    .bind(product_id)
                    .bind(i64::from(quantity))
                    .bind(price_cents)
                    .fetch_one(&self.pool),
            )
            .await?;

        Ok(OrderItem {
            id,
            order_id,
            product_id,
            quantity,
            price: cents_to_price(price_cents),
        })
    }

    /// Get an order by ID.
    pub async fn get_order(&self, id: i64) -> Result<Option<Order>, StorageError> {
        let row = self
            .timed(
                SELECT_BY_ID,
                vec![id.to_string()],
                sqlx::query(SELECT_BY_ID).bind(id).fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    /// Get an order by ID, failing with [`StorageError::NotFound`].
    pub async fn require_order(&self, id: i64) -> Result<Order, StorageError> {
        self.get_order(id)
            .await?
            .ok_or(StorageError::NotFound { entity: "order", id })
    }

    /// The most recent orders, newest first.
    pub async fn list_recent_orders(&self, limit: u32) -> Result<Vec<Order>, StorageError> {
        let rows = self
            .timed(
                SELECT_RECENT,
                vec![limit.to_string()],
                sqlx::query(SELECT_RECENT)
                    .bind(i64::from(limit))
                    .fetch_all(&self.pool),
            )
            .await?;

        rows.iter().map(order_from_row).collect()
    }

    /// All orders, optionally restricted to one status.
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, StorageError> {
        let rows = match status {
            Some(status) => {
                self.timed(
                    SELECT_BY_STATUS,
                    vec![status.to_string()],
                    sqlx::query(SELECT_BY_STATUS)
                        .bind(status.as_str())
                        .fetch_all(&self.pool),
                )
                .await?
            }
            None => {
                self.timed(
                    SELECT_ALL,
                    vec![],
                    sqlx::query(SELECT_ALL).fetch_all(&self.pool),
                )
                .await?
            }
        };

        rows.iter().map(order_from_row).collect()
    }

    /// Move an order to a new status, touching `updated_at`.
    pub async fn update_order_status(
        &self,
        id: i64,
        status: OrderStatus,
    ) -> Result<(), StorageError> {
        let now = Self::format_datetime(Utc::now());
        let result = self
            .timed(
                UPDATE_STATUS,
                vec![status.to_string(), now.clone(), id.to_string()],
                sqlx::query(UPDATE_STATUS)
                    .bind(status.as_str())
                    .bind(&now)
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { entity: "order", id });
        }

        Ok(())
    }

    /// Lines of an order, in insertion order.
    pub async fn order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, StorageError> {
        let rows = self
            .timed(
                SELECT_ITEMS,
                vec![order_id.to_string()],
                sqlx::query(SELECT_ITEMS)
                    .bind(order_id)
                    .fetch_all(&self.pool),
            )
            .await?;

        rows.iter().map(item_from_row).collect()
    }

    /// Sum of price × quantity over an order's items.
    pub async fn order_total(&self, order_id: i64) -> Result<Decimal, StorageError> {
        let cents: i64 = self
            .timed(
                SUM_ITEMS,
                vec![order_id.to_string()],
                sqlx::query_scalar(SUM_ITEMS)
                    .bind(order_id)
                    .fetch_one(&self.pool),
            )
            .await?;

        Ok(cents_to_price(cents))
    }

    /// Number of orders.
    pub async fn count_orders(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .timed(
                COUNT_ALL,
                vec![],
                sqlx::query_scalar(COUNT_ALL).fetch_one(&self.pool),
            )
            .await?;

        Ok(count.unsigned_abs())
    }

    /// Delete an order and its items.
    pub async fn delete_order(&self, id: i64) -> Result<(), StorageError> {
        let result = self
            .timed(
                DELETE_BY_ID,
                vec![id.to_string()],
                sqlx::query(DELETE_BY_ID).bind(id).execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { entity: "order", id });
        }

        Ok(())
    }
}
