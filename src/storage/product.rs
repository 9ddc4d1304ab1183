//! Product storage operations.

#![allow(clippy::missing_errors_doc)]

use crate::error::StorageError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::core::ShopStorage;
use super::types::{cents_to_price, price_to_cents, NewProduct, Product};

const INSERT_PRODUCT: &str = "INSERT INTO products \
     (name, description, price_cents, category_id, owner_id, created_at) \
     VALUES (?, ?, ?, ?, ?, ?) RETURNING id";
const SELECT_BY_ID: &str = "SELECT id, name, description, price_cents, category_id, owner_id, created_at \
     FROM products WHERE id = ?";
const SELECT_ALL: &str = "SELECT id, name, description, price_cents, category_id, owner_id, created_at \
     FROM products ORDER BY id";
const SELECT_BY_CATEGORY: &str = "SELECT id, name, description, price_cents, category_id, owner_id, created_at \
     FROM products WHERE category_id = ? ORDER BY id";
const SELECT_CREATED_SINCE: &str = "SELECT id, name, description, price_cents, category_id, owner_id, created_at \
     FROM products WHERE created_at >= ? ORDER BY id";
const COUNT_ALL: &str = "SELECT COUNT(*) FROM products";
const UPDATE_PRICE: &str = "UPDATE products SET price_cents = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM products WHERE id = ?";

fn product_from_row(row: &SqliteRow) -> Result<Product, StorageError> {
    let created_at: String = row.get("created_at");
    Ok(Product {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        price: cents_to_price(row.get("price_cents")),
        category_id: row.get("category_id"),
        owner_id: row.get("owner_id"),
        created_at: ShopStorage::parse_datetime(&created_at)?,
    })
}

impl ShopStorage {
    /// Create a product.
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, StorageError> {
        let price_cents = price_to_cents(product.price)?;
        let created_at = Self::format_datetime(product.created_at);

        let id: i64 = self
            .timed(
                INSERT_PRODUCT,
                vec![
                    product.name.clone(),
                    "<description>".to_string(),
                    price_cents.to_string(),
                    product.category_id.to_string(),
                    product.owner_id.to_string(),
                    created_at.clone(),
                ],
                sqlx::query_scalar(INSERT_PRODUCT)
                    .bind(&product.name)
                    .bind(&product.description)
                    .bind(price_cents)
                    .bind(product.category_id)
                    .bind(product.owner_id)
                    .bind(&created_at)
                    .fetch_one(&self.pool),
            )
            .await?;

        Ok(Product {
            id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: cents_to_price(price_cents),
            category_id: product.category_id,
            owner_id: product.owner_id,
            created_at: Self::parse_datetime(&created_at)?,
        })
    }

    /// Get a product by ID.
    pub async fn get_product(&self, id: i64) -> Result<Option<Product>, StorageError> {
        let row = self
            .timed(
                SELECT_BY_ID,
                vec![id.to_string()],
                sqlx::query(SELECT_BY_ID).bind(id).fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    /// Get a product by ID, failing with [`StorageError::NotFound`].
    pub async fn require_product(&self, id: i64) -> Result<Product, StorageError> {
        self.get_product(id).await?.ok_or(StorageError::NotFound {
            entity: "product",
            id,
        })
    }

    /// All products, by ID.
    pub async fn list_products(&self) -> Result<Vec<Product>, StorageError> {
        let rows = self
            .timed(
                SELECT_ALL,
                vec![],
                sqlx::query(SELECT_ALL).fetch_all(&self.pool),
            )
            .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Products listed directly under a category.
    pub async fn products_in_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<Product>, StorageError> {
        let rows = self
            .timed(
                SELECT_BY_CATEGORY,
                vec![category_id.to_string()],
                sqlx::query(SELECT_BY_CATEGORY)
                    .bind(category_id)
                    .fetch_all(&self.pool),
            )
            .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Products created at or after `since`.
    pub async fn products_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Product>, StorageError> {
        let since = Self::format_datetime(since);
        let rows = self
            .timed(
                SELECT_CREATED_SINCE,
                vec![since.clone()],
                sqlx::query(SELECT_CREATED_SINCE)
                    .bind(&since)
                    .fetch_all(&self.pool),
            )
            .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Number of products.
    pub async fn count_products(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .timed(
                COUNT_ALL,
                vec![],
                sqlx::query_scalar(COUNT_ALL).fetch_one(&self.pool),
            )
            .await?;

        Ok(count.unsigned_abs())
    }

    /// Change a product's current price.
    ///
    /// Prices already captured on order items are unaffected.
    pub async fn update_product_price(&self, id: i64, price: Decimal) -> Result<(), StorageError> {
        let price_cents = price_to_cents(price)?;
        let result = self
            .timed(
                UPDATE_PRICE,
                vec![price_cents.to_string(), id.to_string()],
                sqlx::query(UPDATE_PRICE)
                    .bind(price_cents)
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity: "product",
                id,
            });
        }

        Ok(())
    }

    /// Delete a product and its order items.
    pub async fn delete_product(&self, id: i64) -> Result<(), StorageError> {
        let result = self
            .timed(
                DELETE_BY_ID,
                vec![id.to_string()],
                sqlx::query(DELETE_BY_ID).bind(id).execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity: "product",
                id,
            });
        }

        Ok(())
    }
}
