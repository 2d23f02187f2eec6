//! Resolver failures and their GraphQL representation
//!
//! Every failure carries a machine-readable `code` extension so clients can
//! branch without parsing messages.

use async_graphql::ErrorExtensions;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    /// The requested board or user does not exist, or a listing came back empty
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The caller is not the owner of the board
    #[error("Only the board owner may do this")]
    Forbidden,

    /// The token could not be verified
    #[error("Invalid token: {0}")]
    Unauthorized(String),

    /// Wrapped failure from the underlying store
    #[error("Database error: {0}")]
    Database(String),
}

impl BoardError {
    pub fn code(&self) -> &'static str {
        match self {
            BoardError::NotFound(_) => "NOT_FOUND",
            BoardError::Forbidden => "FORBIDDEN",
            BoardError::Unauthorized(_) => "UNAUTHORIZED",
            BoardError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl ErrorExtensions for BoardError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

/// Wrap a store failure, logging it before it reaches the caller
pub(crate) fn db_err(err: anyhow::Error) -> BoardError {
    tracing::error!(error = %err, "Store operation failed");
    BoardError::Database(err.to_string())
}
