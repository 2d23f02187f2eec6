//! Automatic schema synchronization from static table definitions
//!
//! - Creates missing tables
//! - Adds missing columns to existing tables
//! - Creates indexes (idempotent)
//! - Does NOT handle column renames or type changes

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

/// Column definition for schema generation.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Column name in the database
    pub name: &'static str,
    /// SQLite column type (TEXT, INTEGER)
    pub sql_type: &'static str,
    /// Whether the column can be NULL
    pub nullable: bool,
    /// Primary key clause, e.g. "PRIMARY KEY AUTOINCREMENT"
    pub primary_key: Option<&'static str>,
    /// Foreign key clause, e.g. "REFERENCES users(pk) ON DELETE CASCADE"
    pub references: Option<&'static str>,
    /// SQL literal used to backfill existing rows when the column is added
    pub default: Option<&'static str>,
}

/// Backfill for timestamp columns; decodes as the Unix epoch
const EPOCH_DEFAULT: &str = "'1970-01-01T00:00:00.000000Z'";

impl ColumnDef {
    const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            nullable: false,
            primary_key: None,
            references: None,
            default: None,
        }
    }

    const fn primary_key(mut self, clause: &'static str) -> Self {
        self.primary_key = Some(clause);
        self
    }

    const fn references(mut self, clause: &'static str) -> Self {
        self.references = Some(clause);
        self
    }

    const fn default(mut self, literal: &'static str) -> Self {
        self.default = Some(literal);
        self
    }

    /// Generate the column definition SQL
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);

        if let Some(pk) = self.primary_key {
            sql.push(' ');
            sql.push_str(pk);
        } else if !self.nullable {
            sql.push_str(" NOT NULL");
        }

        if let Some(references) = self.references {
            sql.push(' ');
            sql.push_str(references);
        }

        sql
    }

    /// SQL for adding this column to an existing table.
    ///
    /// SQLite rejects `ADD COLUMN ... NOT NULL` without a default, so existing
    /// rows are backfilled with the column's default, or `''` if it has none.
    /// Key columns cannot be backfilled and are refused.
    fn to_add_column_sql(&self, table: &str) -> Result<String, String> {
        if self.primary_key.is_some() || self.references.is_some() {
            return Err(format!(
                "Cannot add key column {}.{} to an existing table",
                table, self.name
            ));
        }

        let mut sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, self.name, self.sql_type);
        if !self.nullable {
            sql.push_str(" NOT NULL DEFAULT ");
            sql.push_str(self.default.unwrap_or("''"));
        }
        Ok(sql)
    }
}

/// A table and its indexes
#[derive(Debug, Clone)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub indexes: &'static [&'static str],
}

impl TableDef {
    /// Generate CREATE TABLE IF NOT EXISTS SQL
    pub fn create_table_sql(&self) -> String {
        let column_defs: Vec<String> = self.columns.iter().map(|c| c.to_sql()).collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            self.name,
            column_defs.join(",\n  ")
        )
    }
}

pub const USERS_TABLE: TableDef = TableDef {
    name: "users",
    columns: &[
        ColumnDef::new("pk", "TEXT").primary_key("PRIMARY KEY"),
        ColumnDef::new("name", "TEXT"),
        ColumnDef::new("created_at", "TEXT").default(EPOCH_DEFAULT),
    ],
    indexes: &[],
};

pub const BOARDS_TABLE: TableDef = TableDef {
    name: "boards",
    columns: &[
        ColumnDef::new("pk", "INTEGER").primary_key("PRIMARY KEY AUTOINCREMENT"),
        ColumnDef::new("user_pk", "TEXT").references("REFERENCES users(pk) ON DELETE CASCADE"),
        ColumnDef::new("title", "TEXT"),
        ColumnDef::new("content", "TEXT"),
        ColumnDef::new("created_at", "TEXT").default(EPOCH_DEFAULT),
        ColumnDef::new("updated_at", "TEXT").default(EPOCH_DEFAULT),
    ],
    indexes: &[
        "CREATE INDEX IF NOT EXISTS idx_boards_user_pk ON boards(user_pk)",
        "CREATE INDEX IF NOT EXISTS idx_boards_created_at ON boards(created_at)",
    ],
};

pub const COMMENTS_TABLE: TableDef = TableDef {
    name: "comments",
    columns: &[
        ColumnDef::new("pk", "INTEGER").primary_key("PRIMARY KEY AUTOINCREMENT"),
        ColumnDef::new("board_pk", "INTEGER")
            .references("REFERENCES boards(pk) ON DELETE CASCADE"),
        ColumnDef::new("user_pk", "TEXT").references("REFERENCES users(pk) ON DELETE CASCADE"),
        ColumnDef::new("content", "TEXT"),
        ColumnDef::new("created_at", "TEXT").default(EPOCH_DEFAULT),
        ColumnDef::new("updated_at", "TEXT").default(EPOCH_DEFAULT),
    ],
    indexes: &["CREATE INDEX IF NOT EXISTS idx_comments_board_pk ON comments(board_pk)"],
};

/// Tables in dependency order
pub const ALL_TABLES: &[TableDef] = &[USERS_TABLE, BOARDS_TABLE, COMMENTS_TABLE];

/// Result of a schema sync operation
#[derive(Debug, Default)]
pub struct SchemaSyncResult {
    pub tables_created: Vec<String>,
    pub columns_added: Vec<(String, String)>, // (table, column)
    pub errors: Vec<String>,
}

impl SchemaSyncResult {
    fn merge(&mut self, other: SchemaSyncResult) {
        self.tables_created.extend(other.tables_created);
        self.columns_added.extend(other.columns_added);
        self.errors.extend(other.errors);
    }
}

/// Check if a table exists in the database
async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool, sqlx::Error> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table_name)
            .fetch_optional(pool)
            .await?;

    Ok(result.is_some())
}

/// Get existing columns for a table
async fn get_table_columns(
    pool: &SqlitePool,
    table_name: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(i32, String, String, i32, Option<String>, i32)> =
        sqlx::query_as(&format!("PRAGMA table_info({})", table_name))
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(_, name, _, _, _, _)| name).collect())
}

/// Sync a single table to the database
pub async fn sync_table(
    pool: &SqlitePool,
    table: &TableDef,
) -> Result<SchemaSyncResult, sqlx::Error> {
    let mut result = SchemaSyncResult::default();

    if !table_exists(pool, table.name).await? {
        let create_sql = table.create_table_sql();
        debug!("Creating table {}: {}", table.name, create_sql);

        match sqlx::query(&create_sql).execute(pool).await {
            Ok(_) => {
                info!("Created table: {}", table.name);
                result.tables_created.push(table.name.to_string());
            }
            Err(e) => {
                let msg = format!("Failed to create table {}: {}", table.name, e);
                warn!("{}", msg);
                result.errors.push(msg);
                return Ok(result);
            }
        }
    } else {
        let existing = get_table_columns(pool, table.name).await?;

        for column in table.columns {
            if existing.iter().any(|c| c == column.name) {
                continue;
            }

            let alter_sql = match column.to_add_column_sql(table.name) {
                Ok(sql) => sql,
                Err(msg) => {
                    warn!("{}", msg);
                    result.errors.push(msg);
                    continue;
                }
            };
            debug!("Adding column {}.{}: {}", table.name, column.name, alter_sql);

            match sqlx::query(&alter_sql).execute(pool).await {
                Ok(_) => {
                    info!("Added column {}.{}", table.name, column.name);
                    result
                        .columns_added
                        .push((table.name.to_string(), column.name.to_string()));
                }
                Err(e) => {
                    let msg = format!("Failed to add column {}.{}: {}", table.name, column.name, e);
                    warn!("{}", msg);
                    result.errors.push(msg);
                }
            }
        }
    }

    for index_sql in table.indexes {
        if let Err(e) = sqlx::query(index_sql).execute(pool).await {
            let msg = format!("Failed to create index on {}: {}", table.name, e);
            warn!("{}", msg);
            result.errors.push(msg);
        }
    }

    Ok(result)
}

/// Sync all tables
pub async fn sync_all_tables(pool: &SqlitePool) -> Result<SchemaSyncResult, sqlx::Error> {
    let mut result = SchemaSyncResult::default();

    for table in ALL_TABLES {
        result.merge(sync_table(pool, table).await?);
    }

    Ok(result)
}
