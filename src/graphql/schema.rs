//! GraphQL schema definition with queries and mutations

use std::sync::Arc;

use async_graphql::extensions::Tracing;
use async_graphql::{EmptySubscription, MergedObject, Schema};

use crate::db::{BoardStore, CommentStore, Database, UserStore};

use super::auth::TokenVerifier;
use super::mutations::BoardMutations;
use super::queries::BoardQueries;

/// The GraphQL schema type
pub type BoardSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(BoardQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(BoardMutations);

/// Collaborators the resolvers reach through the schema data
#[derive(Clone)]
pub struct SchemaDeps {
    pub boards: Arc<dyn BoardStore>,
    pub users: Arc<dyn UserStore>,
    pub comments: Arc<dyn CommentStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl SchemaDeps {
    /// Back every store with the sqlx repositories of `db`
    pub fn from_database(db: &Database, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            boards: Arc::new(db.boards()),
            users: Arc::new(db.users()),
            comments: Arc::new(db.comments()),
            verifier,
        }
    }
}

/// Build the GraphQL schema with all resolvers
pub fn build_schema(deps: SchemaDeps) -> BoardSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(deps.boards)
        .data(deps.users)
        .data(deps.comments)
        .data(deps.verifier)
        .extension(Tracing)
        .finish()
}
