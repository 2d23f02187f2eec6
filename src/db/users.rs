//! Users repository
//!
//! Users are owned by the identity side of the system; this service only
//! needs to resolve a token's key to a user and to seed users in tooling.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::sqlite_helpers::{decode_datetime, new_user_key, now_iso8601};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub pk: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for UserRecord {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> sqlx::Result<Self> {
        use sqlx::Row;

        let created_at: String = row.try_get("created_at")?;

        Ok(Self {
            pk: row.try_get("pk")?,
            name: row.try_get("name")?,
            created_at: decode_datetime(&created_at)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Explicit key; a fresh UUID is generated when absent
    pub pk: Option<String>,
    pub name: String,
}

impl CreateUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            pk: None,
            name: name.into(),
        }
    }

    pub fn with_pk(mut self, pk: impl Into<String>) -> Self {
        self.pk = Some(pk.into());
        self
    }
}

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, user: CreateUser) -> Result<UserRecord> {
        let pk = user.pk.unwrap_or_else(new_user_key);

        sqlx::query("INSERT INTO users (pk, name, created_at) VALUES (?, ?, ?)")
            .bind(&pk)
            .bind(&user.name)
            .bind(now_iso8601())
            .execute(&self.pool)
            .await?;

        self.get_by_id(&pk)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to create user"))
    }

    /// Get user by key
    pub async fn get_by_id(&self, pk: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT pk, name, created_at FROM users WHERE pk = ?",
        )
        .bind(pk)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
