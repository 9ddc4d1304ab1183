//! User storage operations.

#![allow(clippy::missing_errors_doc)]

use crate::error::StorageError;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::core::ShopStorage;
use super::types::{NewUser, User};

const INSERT_USER: &str = "INSERT INTO users (username, email, password_hash, is_superuser, date_joined) \
     VALUES (?, ?, ?, ?, ?) ON CONFLICT(username) DO NOTHING RETURNING id";
const SELECT_BY_ID: &str =
    "SELECT id, username, email, is_superuser, date_joined FROM users WHERE id = ?";
const SELECT_BY_USERNAME: &str =
    "SELECT id, username, email, is_superuser, date_joined FROM users WHERE username = ?";
const SELECT_ALL: &str =
    "SELECT id, username, email, is_superuser, date_joined FROM users ORDER BY id";
const COUNT_ALL: &str = "SELECT COUNT(*) FROM users";
const DELETE_BY_ID: &str = "DELETE FROM users WHERE id = ?";

fn user_from_row(row: &SqliteRow) -> Result<User, StorageError> {
    let date_joined: String = row.get("date_joined");
    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        is_superuser: row.get("is_superuser"),
        date_joined: ShopStorage::parse_datetime(&date_joined)?,
    })
}

impl ShopStorage {
    /// Create a user.
    ///
    /// Returns `None` when the username is already taken.
    pub async fn create_user(&self, user: &NewUser) -> Result<Option<User>, StorageError> {
        let now_str = Self::format_datetime(Utc::now());

        let id: Option<i64> = self
            .timed(
                INSERT_USER,
                vec![
                    user.username.clone(),
                    user.email.clone(),
                    "<hash>".to_string(),
                    user.is_superuser.to_string(),
                    now_str.clone(),
                ],
                sqlx::query_scalar(INSERT_USER)
                    .bind(&user.username)
                    .bind(&user.email)
                    .bind(&user.password_hash)
                    .bind(user.is_superuser)
                    .bind(&now_str)
                    .fetch_optional(&self.pool),
            )
            .await?;

        let date_joined = Self::parse_datetime(&now_str)?;
        Ok(id.map(|id| User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_superuser: user.is_superuser,
            date_joined,
        }))
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        let row = self
            .timed(
                SELECT_BY_ID,
                vec![id.to_string()],
                sqlx::query(SELECT_BY_ID).bind(id).fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Get a user by ID, failing with [`StorageError::NotFound`].
    pub async fn require_user(&self, id: i64) -> Result<User, StorageError> {
        self.get_user(id)
            .await?
            .ok_or(StorageError::NotFound { entity: "user", id })
    }

    /// Get a user by username.
    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, StorageError> {
        let row = self
            .timed(
                SELECT_BY_USERNAME,
                vec![username.to_string()],
                sqlx::query(SELECT_BY_USERNAME)
                    .bind(username)
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// All users, by ID.
    pub async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let rows = self
            .timed(
                SELECT_ALL,
                vec![],
                sqlx::query(SELECT_ALL).fetch_all(&self.pool),
            )
            .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// Number of users.
    pub async fn count_users(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .timed(
                COUNT_ALL,
                vec![],
                sqlx::query_scalar(COUNT_ALL).fetch_one(&self.pool),
            )
            .await?;

        Ok(count.unsigned_abs())
    }

    /// Delete a user together with their products and orders.
    pub async fn delete_user(&self, id: i64) -> Result<(), StorageError> {
        let result = self
            .timed(
                DELETE_BY_ID,
                vec![id.to_string()],
                sqlx::query(DELETE_BY_ID).bind(id).execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { entity: "user", id });
        }

        Ok(())
    }
}
