//! Store-access interfaces injected into the GraphQL schema
//!
//! Resolvers only see these traits; the sqlx repositories are one
//! implementation and tests can substitute their own.

use anyhow::Result;
use async_trait::async_trait;

use super::{
    BoardRecord, BoardRepository, CommentRecord, CommentRepository, CreateBoard, UpdateBoard,
    UserRecord, UserRepository,
};

#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn get(&self, pk: i64) -> Result<Option<BoardRecord>>;

    async fn list_by_user(&self, user_pk: &str) -> Result<Vec<BoardRecord>>;

    async fn list_recent(&self, limit: i64) -> Result<Vec<BoardRecord>>;

    async fn create(&self, board: CreateBoard) -> Result<BoardRecord>;

    async fn update(&self, pk: i64, update: UpdateBoard) -> Result<Option<BoardRecord>>;

    async fn delete(&self, pk: i64) -> Result<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, pk: &str) -> Result<Option<UserRecord>>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn list_by_board(&self, board_pk: i64) -> Result<Vec<CommentRecord>>;
}

#[async_trait]
impl BoardStore for BoardRepository {
    async fn get(&self, pk: i64) -> Result<Option<BoardRecord>> {
        self.get_by_id(pk).await
    }

    async fn list_by_user(&self, user_pk: &str) -> Result<Vec<BoardRecord>> {
        BoardRepository::list_by_user(self, user_pk).await
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<BoardRecord>> {
        BoardRepository::list_recent(self, limit).await
    }

    async fn create(&self, board: CreateBoard) -> Result<BoardRecord> {
        BoardRepository::create(self, board).await
    }

    async fn update(&self, pk: i64, update: UpdateBoard) -> Result<Option<BoardRecord>> {
        BoardRepository::update(self, pk, update).await
    }

    async fn delete(&self, pk: i64) -> Result<bool> {
        BoardRepository::delete(self, pk).await
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn get(&self, pk: &str) -> Result<Option<UserRecord>> {
        self.get_by_id(pk).await
    }
}

#[async_trait]
impl CommentStore for CommentRepository {
    async fn list_by_board(&self, board_pk: i64) -> Result<Vec<CommentRecord>> {
        CommentRepository::list_by_board(self, board_pk).await
    }
}
