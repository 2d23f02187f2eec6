//! Boards repository
//!
//! Every read joins the owning user so callers always have the owner's name.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::sqlite_helpers::{decode_datetime, now_iso8601};

const SELECT_BOARD: &str = r#"
    SELECT b.pk, b.user_pk, u.name AS user_name, b.title, b.content, b.created_at, b.updated_at
    FROM boards b
    INNER JOIN users u ON u.pk = b.user_pk
"#;

/// A board row joined with its owner's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardRecord {
    pub pk: i64,
    pub user_pk: String,
    pub user_name: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for BoardRecord {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self {
            pk: row.try_get("pk")?,
            user_pk: row.try_get("user_pk")?,
            user_name: row.try_get("user_name")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            created_at: decode_datetime(&created_at)?,
            updated_at: decode_datetime(&updated_at)?,
        })
    }
}

/// Input for creating a new board
#[derive(Debug, Clone)]
pub struct CreateBoard {
    pub user_pk: String,
    pub title: String,
    pub content: String,
}

/// Partial update; `None` fields keep their stored value
#[derive(Debug, Clone, Default)]
pub struct UpdateBoard {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdateBoard {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

pub struct BoardRepository {
    pool: SqlitePool,
}

impl BoardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a board by primary key
    pub async fn get_by_id(&self, pk: i64) -> Result<Option<BoardRecord>> {
        let board = sqlx::query_as::<_, BoardRecord>(&format!("{SELECT_BOARD} WHERE b.pk = ?"))
            .bind(pk)
            .fetch_optional(&self.pool)
            .await?;

        Ok(board)
    }

    /// All boards owned by a user, newest first
    pub async fn list_by_user(&self, user_pk: &str) -> Result<Vec<BoardRecord>> {
        let boards = sqlx::query_as::<_, BoardRecord>(&format!(
            "{SELECT_BOARD} WHERE b.user_pk = ? ORDER BY b.created_at DESC, b.pk DESC"
        ))
        .bind(user_pk)
        .fetch_all(&self.pool)
        .await?;

        Ok(boards)
    }

    /// The most recently created boards
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<BoardRecord>> {
        let boards = sqlx::query_as::<_, BoardRecord>(&format!(
            "{SELECT_BOARD} ORDER BY b.created_at DESC, b.pk DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(boards)
    }

    /// Create a new board
    pub async fn create(&self, board: CreateBoard) -> Result<BoardRecord> {
        let now = now_iso8601();

        let result = sqlx::query(
            r#"
            INSERT INTO boards (user_pk, title, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&board.user_pk)
        .bind(&board.title)
        .bind(&board.content)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let pk = result.last_insert_rowid();
        self.get_by_id(pk)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create board"))
    }

    /// Update a board in place.
    ///
    /// Returns the updated board, or None if it does not exist.
    pub async fn update(&self, pk: i64, update: UpdateBoard) -> Result<Option<BoardRecord>> {
        if update.is_empty() {
            return self.get_by_id(pk).await;
        }

        let affected = sqlx::query(
            r#"
            UPDATE boards
            SET title = COALESCE(?, title),
                content = COALESCE(?, content),
                updated_at = ?
            WHERE pk = ?
            "#,
        )
        .bind(&update.title)
        .bind(&update.content)
        .bind(now_iso8601())
        .bind(pk)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Ok(None);
        }

        self.get_by_id(pk).await
    }

    /// Delete a board.
    ///
    /// Returns true if a board was deleted, false if not found.
    pub async fn delete(&self, pk: i64) -> Result<bool> {
        let affected = sqlx::query("DELETE FROM boards WHERE pk = ?")
            .bind(pk)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }
}
