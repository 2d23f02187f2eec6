//! Board Service - GraphQL backend for forum boards
//!
//! Boards are created, listed, updated and deleted through GraphQL at
//! /graphql. Ownership is checked against the user identity carried by a
//! token argument.

pub mod api;
pub mod config;
pub mod db;
pub mod graphql;

use crate::db::Database;
use crate::graphql::BoardSchema;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub schema: BoardSchema,
}
