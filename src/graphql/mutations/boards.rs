use super::prelude::*;

#[derive(Default)]
pub struct BoardMutations;

#[Object]
impl BoardMutations {
    /// Create a board owned by the token's user
    async fn create_board(
        &self,
        ctx: &Context<'_>,
        token: String,
        title: String,
        content: String,
    ) -> Result<bool> {
        create_board(ctx, &token, title, content)
            .await
            .map_err(|e| e.extend())
    }

    /// Update a board's title and/or content. Omitted fields are left unchanged.
    async fn update_board(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "board_pk")] board_pk: i32,
        title: Option<String>,
        content: Option<String>,
        token: String,
    ) -> Result<bool> {
        update_board(ctx, board_pk, UpdateBoard { title, content }, &token)
            .await
            .map_err(|e| e.extend())
    }

    /// Delete a board owned by the token's user
    async fn delete_board(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "board_pk")] board_pk: i32,
        token: String,
    ) -> Result<bool> {
        delete_board(ctx, board_pk, &token)
            .await
            .map_err(|e| e.extend())
    }
}

async fn update_board(
    ctx: &Context<'_>,
    board_pk: i32,
    update: UpdateBoard,
    token: &str,
) -> Result<bool, BoardError> {
    let auth = ctx.verify_token(token)?;
    let board = require_owned_board(ctx, board_pk, &auth.user_id).await?;

    // The board may vanish between the ownership check and the write
    board_store(ctx)
        .update(board.pk, update)
        .await
        .map_err(db_err)?
        .ok_or(BoardError::NotFound("Board"))?;

    tracing::info!(board_pk, user_pk = %auth.user_id, "Board updated");
    Ok(true)
}

async fn delete_board(ctx: &Context<'_>, board_pk: i32, token: &str) -> Result<bool, BoardError> {
    let auth = ctx.verify_token(token)?;
    let board = require_owned_board(ctx, board_pk, &auth.user_id).await?;

    if !board_store(ctx).delete(board.pk).await.map_err(db_err)? {
        return Err(BoardError::NotFound("Board"));
    }

    tracing::info!(board_pk, user_pk = %auth.user_id, "Board deleted");
    Ok(true)
}
