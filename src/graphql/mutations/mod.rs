pub mod boards;

pub use boards::BoardMutations;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, ErrorExtensions, Object, Result};

    pub(crate) use crate::db::UpdateBoard;
    pub(crate) use crate::graphql::auth::AuthExt;
    pub(crate) use crate::graphql::error::{BoardError, db_err};
    pub(crate) use crate::graphql::helpers::*;
}
