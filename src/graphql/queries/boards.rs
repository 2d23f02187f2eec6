use super::prelude::*;

/// Number of boards returned by `allBoards`
const RECENT_BOARDS_LIMIT: i64 = 5;

#[derive(Default)]
pub struct BoardQueries;

#[Object]
impl BoardQueries {
    /// Get a single board with its comments.
    ///
    /// When a token is given, `isWrite` tells whether its user owns the board.
    async fn board(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "board_pk")] board_pk: i32,
        token: Option<String>,
    ) -> Result<Board> {
        board_detail(ctx, board_pk, token.as_deref())
            .await
            .map_err(|e| e.extend())
    }

    /// Get every board owned by the token's user
    async fn my_boards(&self, ctx: &Context<'_>, token: String) -> Result<Vec<Option<Board>>> {
        my_boards(ctx, &token).await.map_err(|e| e.extend())
    }

    /// Get the most recently created boards
    async fn all_boards(&self, ctx: &Context<'_>) -> Result<Vec<Option<Board>>> {
        let boards = board_store(ctx)
            .list_recent(RECENT_BOARDS_LIMIT)
            .await
            .map_err(|e| db_err(e).extend())?;

        if boards.is_empty() {
            return Err(BoardError::NotFound("Board").extend());
        }

        boards
            .into_iter()
            .map(|b| board_record_to_graphql(b).map(Some))
            .collect::<Result<Vec<_>, BoardError>>()
            .map_err(|e| e.extend())
    }

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
}

async fn board_detail(
    ctx: &Context<'_>,
    board_pk: i32,
    token: Option<&str>,
) -> Result<Board, BoardError> {
    let record = require_board(ctx, board_pk).await?;
    let viewer = ctx.verify_optional_token(token)?;

    let comments = comment_store(ctx)
        .list_by_board(record.pk)
        .await
        .map_err(db_err)?;

    let is_write = viewer.map(|user| user.user_id == record.user_pk);
    tracing::debug!(board_pk, ?is_write, comments = comments.len(), "Board fetched");

    let mut board = board_record_to_graphql(record)?;
    board.is_write = is_write;
    board.comment = Some(
        comments
            .into_iter()
            .map(|c| comment_record_to_graphql(c).map(Some))
            .collect::<Result<Vec<_>, BoardError>>()?,
    );
    Ok(board)
}

async fn my_boards(ctx: &Context<'_>, token: &str) -> Result<Vec<Option<Board>>, BoardError> {
    let auth = ctx.verify_token(token)?;
    let user = user_store(ctx)
        .get(&auth.user_id)
        .await
        .map_err(db_err)?
        .ok_or(BoardError::NotFound("User"))?;

    let boards = board_store(ctx)
        .list_by_user(&user.pk)
        .await
        .map_err(db_err)?;

    if boards.is_empty() {
        return Err(BoardError::NotFound("Board"));
    }

    tracing::debug!(user_pk = %user.pk, count = boards.len(), "Listed user boards");
    boards
        .into_iter()
        .map(|b| board_record_to_graphql(b).map(Some))
        .collect()
}
