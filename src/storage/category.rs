//! Category storage operations.

#![allow(clippy::missing_errors_doc)]

use crate::error::StorageError;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::core::{optional_param, ShopStorage};
use super::types::Category;

const SELECT_BY_NAME_PARENT: &str =
    "SELECT id, name, parent_id FROM categories WHERE name = ? AND parent_id IS ?";
const INSERT_CATEGORY: &str = "INSERT INTO categories (name, parent_id) VALUES (?, ?) RETURNING id";
const SELECT_BY_ID: &str = "SELECT id, name, parent_id FROM categories WHERE id = ?";
const SELECT_ALL: &str = "SELECT id, name, parent_id FROM categories ORDER BY id";
const COUNT_ALL: &str = "SELECT COUNT(*) FROM categories";
const DELETE_BY_ID: &str = "DELETE FROM categories WHERE id = ?";

fn category_from_row(row: &SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        parent_id: row.get("parent_id"),
    }
}

impl ShopStorage {
    /// Look up a category by its (name, parent) key, creating it if absent.
    ///
    /// Returns the category and whether it was created.
    pub async fn get_or_create_category(
        &self,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<(Category, bool), StorageError> {
        let existing = self
            .timed(
                SELECT_BY_NAME_PARENT,
                vec![name.to_string(), optional_param(parent_id)],
                sqlx::query(SELECT_BY_NAME_PARENT)
                    .bind(name)
                    .bind(parent_id)
                    .fetch_optional(&self.pool),
            )
            .await?;

        if let Some(row) = existing {
            return Ok((category_from_row(&row), false));
        }

        let id: i64 = self
            .timed(
                INSERT_CATEGORY,
                vec![name.to_string(), optional_param(parent_id)],
                sqlx::query_scalar(INSERT_CATEGORY)
                    .bind(name)
                    .bind(parent_id)
                    .fetch_one(&self.pool),
            )
            .await?;

        Ok((
            Category {
                id,
                name: name.to_string(),
                parent_id,
            },
            true,
        ))
    }

    /// Get a category by ID.
    pub async fn get_category(&self, id: i64) -> Result<Option<Category>, StorageError> {
        let row = self
            .timed(
                SELECT_BY_ID,
                vec![id.to_string()],
                sqlx::query(SELECT_BY_ID).bind(id).fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.as_ref().map(category_from_row))
    }

    /// Get a category by ID, failing with [`StorageError::NotFound`].
    pub async fn require_category(&self, id: i64) -> Result<Category, StorageError> {
        self.get_category(id)
            .await?
            .ok_or(StorageError::NotFound {
                entity: "category",
                id,
            })
    }

    /// All categories, by ID.
    pub async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let rows = self
            .timed(
                SELECT_ALL,
                vec![],
                sqlx::query(SELECT_ALL).fetch_all(&self.pool),
            )
            .await?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    /// Number of categories.
    pub async fn count_categories(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .timed(
                COUNT_ALL,
                vec![],
                sqlx::query_scalar(COUNT_ALL).fetch_one(&self.pool),
            )
            .await?;

        Ok(count.unsigned_abs())
    }

    /// Delete a category, its subcategories and their products.
    pub async fn delete_category(&self, id: i64) -> Result<(), StorageError> {
        let result = self
            .timed(
                DELETE_BY_ID,
                vec![id.to_string()],
                sqlx::query(DELETE_BY_ID).bind(id).execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity: "category",
                id,
            });
        }

        Ok(())
    }

    /// Category names from the root ancestor down to `id`.
    ///
    /// Walks parent links one lookup at a time.
    pub async fn category_path(&self, id: i64) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        let mut visited = Vec::new();
        let mut next = Some(id);

        while let Some(current) = next {
            if visited.contains(&current) {
                return Err(StorageError::Internal {
                    message: format!("Category cycle at {current}"),
                });
            }
            visited.push(current);

            let category = self.require_category(current).await?;
            names.push(category.name);
            next = category.parent_id;
        }

        names.reverse();
        Ok(names)
    }
}
