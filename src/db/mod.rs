//! Database connection and operations

pub mod boards;
pub mod comments;
pub mod schema_sync;
pub mod sqlite_helpers;
pub mod store;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use boards::{BoardRecord, BoardRepository, CreateBoard, UpdateBoard};
pub use comments::{CommentRecord, CommentRepository, CreateComment};
pub use schema_sync::{SchemaSyncResult, sync_all_tables};
pub use store::{BoardStore, CommentStore, UserStore};
pub use users::{CreateUser, UserRecord, UserRepository};

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new database connection pool.
    ///
    /// The database file is created if missing and foreign keys are enforced.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid DATABASE_URL '{}'", url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that never expires.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a board repository
    pub fn boards(&self) -> BoardRepository {
        BoardRepository::new(self.pool.clone())
    }

    /// Get a users repository
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Get a comments repository
    pub fn comments(&self) -> CommentRepository {
        CommentRepository::new(self.pool.clone())
    }

    /// Create missing tables and columns
    pub async fn migrate(&self) -> Result<SchemaSyncResult> {
        let result = sync_all_tables(&self.pool).await?;
        if let Some(err) = result.errors.first() {
            anyhow::bail!("Schema sync failed: {}", err);
        }
        Ok(result)
    }

    /// Check that the database answers
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
