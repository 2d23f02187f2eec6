// Helper functions shared across GraphQL query/mutation modules.

use std::sync::Arc;

use async_graphql::Context;

use crate::db::{BoardRecord, BoardStore, CommentRecord, CommentStore, CreateBoard, UserStore};
use crate::graphql::auth::AuthExt;
use crate::graphql::error::{BoardError, db_err};
use crate::graphql::types::{Board, Comment};

pub(crate) fn board_store<'a>(ctx: &Context<'a>) -> &'a Arc<dyn BoardStore> {
    ctx.data_unchecked::<Arc<dyn BoardStore>>()
}

pub(crate) fn user_store<'a>(ctx: &Context<'a>) -> &'a Arc<dyn UserStore> {
    ctx.data_unchecked::<Arc<dyn UserStore>>()
}

pub(crate) fn comment_store<'a>(ctx: &Context<'a>) -> &'a Arc<dyn CommentStore> {
    ctx.data_unchecked::<Arc<dyn CommentStore>>()
}

/// Narrow a row key to the GraphQL `Int` range
fn graphql_key(pk: i64) -> Result<i32, BoardError> {
    i32::try_from(pk).map_err(|_| {
        tracing::error!(pk, "Row key outside the Int range");
        BoardError::Database(format!("key {} does not fit in Int", pk))
    })
}

/// Convert a BoardRecord from the database to a GraphQL Board without
/// ownership or comment data
pub(crate) fn board_record_to_graphql(r: BoardRecord) -> Result<Board, BoardError> {
    Ok(Board {
        pk: graphql_key(r.pk)?,
        user_pk: r.user_pk,
        user_name: r.user_name,
        title: r.title,
        content: r.content,
        created_at: r.created_at.into(),
        updated_at: r.updated_at.into(),
        is_write: None,
        comment: None,
    })
}

pub(crate) fn comment_record_to_graphql(r: CommentRecord) -> Result<Comment, BoardError> {
    Ok(Comment {
        pk: graphql_key(r.pk)?,
        board_pk: graphql_key(r.board_pk)?,
        user_pk: r.user_pk,
        content: r.content,
        created_at: r.created_at.into(),
        updated_at: r.updated_at.into(),
    })
}

/// Fetch a board that must exist
pub(crate) async fn require_board(ctx: &Context<'_>, board_pk: i32) -> Result<BoardRecord, BoardError> {
    board_store(ctx)
        .get(i64::from(board_pk))
        .await
        .map_err(db_err)?
        .ok_or(BoardError::NotFound("Board"))
}

/// Fetch a board and check that `user_pk` owns it
pub(crate) async fn require_owned_board(
    ctx: &Context<'_>,
    board_pk: i32,
    user_pk: &str,
) -> Result<BoardRecord, BoardError> {
    let board = require_board(ctx, board_pk).await?;
    if board.user_pk != user_pk {
        tracing::warn!(board_pk, user_pk, owner_pk = %board.user_pk, "Rejected non-owner");
        return Err(BoardError::Forbidden);
    }
    Ok(board)
}

/// Create a board owned by the token's user. Shared by the query and
/// mutation fields of the same name.
pub(crate) async fn create_board(
    ctx: &Context<'_>,
    token: &str,
    title: String,
    content: String,
) -> Result<bool, BoardError> {
    let auth = ctx.verify_token(token)?;
    let user = user_store(ctx)
        .get(&auth.user_id)
        .await
        .map_err(db_err)?
        .ok_or(BoardError::NotFound("User"))?;

    let board = board_store(ctx)
        .create(CreateBoard {
            user_pk: user.pk,
            title,
            content,
        })
        .await
        .map_err(db_err)?;

    tracing::info!(board_pk = board.pk, user_pk = %board.user_pk, "Board created");
    Ok(true)
}
