//! Comments repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::sqlite_helpers::{decode_datetime, now_iso8601};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub pk: i64,
    pub board_pk: i64,
    pub user_pk: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for CommentRecord {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self {
            pk: row.try_get("pk")?,
            board_pk: row.try_get("board_pk")?,
            user_pk: row.try_get("user_pk")?,
            content: row.try_get("content")?,
            created_at: decode_datetime(&created_at)?,
            updated_at: decode_datetime(&updated_at)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    pub board_pk: i64,
    pub user_pk: String,
    pub content: String,
}

pub struct CommentRepository {
    pool: SqlitePool,
}

impl CommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, comment: CreateComment) -> Result<CommentRecord> {
        let now = now_iso8601();

        let pk = sqlx::query(
            r#"
            INSERT INTO comments (board_pk, user_pk, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(comment.board_pk)
        .bind(&comment.user_pk)
        .bind(&comment.content)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        let created = sqlx::query_as::<_, CommentRecord>(
            "SELECT pk, board_pk, user_pk, content, created_at, updated_at FROM comments WHERE pk = ?",
        )
        .bind(pk)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Comments on a board, oldest first
    pub async fn list_by_board(&self, board_pk: i64) -> Result<Vec<CommentRecord>> {
        let comments = sqlx::query_as::<_, CommentRecord>(
            r#"
            SELECT pk, board_pk, user_pk, content, created_at, updated_at
            FROM comments
            WHERE board_pk = ?
            ORDER BY created_at ASC, pk ASC
            "#,
        )
        .bind(board_pk)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
