//! Application configuration management

use std::env;

use anyhow::{Context, Result};

/// Default lifetime of issued access tokens: 7 days
const DEFAULT_TOKEN_LIFETIME: i64 = 7 * 24 * 60 * 60;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// SQLite connection URL
    pub database_url: String,

    /// Maximum pooled database connections
    pub database_max_connections: u32,

    /// JWT secret for token verification
    pub jwt_secret: String,

    /// Lifetime of issued tokens in seconds
    pub token_lifetime: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            // In production, this should be set explicitly
            tracing::warn!("JWT_SECRET not set; tokens will not survive a restart");
            format!("dev-secret-{}", uuid::Uuid::new_v4())
        });

        Ok(Self {
            port: var("PORT")
                .unwrap_or_else(|| "3001".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:./data/boards.db?mode=rwc".to_string()),

            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .map(|s| s.parse::<u32>().context("Invalid DATABASE_MAX_CONNECTIONS"))
                .transpose()?
                .unwrap_or(10),

            jwt_secret,

            token_lifetime: var("TOKEN_LIFETIME")
                .map(|s| s.parse::<i64>().context("Invalid TOKEN_LIFETIME"))
                .transpose()?
                .unwrap_or(DEFAULT_TOKEN_LIFETIME),
        })
    }
}
