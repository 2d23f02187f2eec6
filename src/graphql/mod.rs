//! GraphQL API for boards
//!
//! Resolvers live in `queries/` and `mutations/`, one struct per domain,
//! merged into the roots in `schema.rs`. Store access and token
//! verification are injected through the schema data.

pub mod auth;
pub mod error;
mod helpers;
pub mod mutations;
pub mod queries;
mod schema;
pub mod types;

pub use auth::{AuthUser, JwtVerifier, TokenVerifier};
pub use error::BoardError;
pub use schema::{BoardSchema, MutationRoot, QueryRoot, SchemaDeps, build_schema};
pub use types::{Board, Comment, Date};
