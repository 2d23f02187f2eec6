//! End-to-end tests for the board GraphQL API
//!
//! Every test runs the real schema against a private in-memory SQLite
//! database, minting tokens with the same verifier the schema uses.

use std::sync::Arc;

use anyhow::anyhow;
use async_graphql::{Request, Response, Variables};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use board_service::db::{
    BoardRecord, BoardStore, CreateBoard, CreateComment, CreateUser, Database, UpdateBoard,
};
use board_service::graphql::{BoardSchema, JwtVerifier, SchemaDeps, TokenVerifier, build_schema};

const BOARD_QUERY: &str = r#"
    query ($pk: Int!, $token: String) {
        board(board_pk: $pk, token: $token) {
            pk user_pk user_name title content createdAt updatedAt isWrite
            comment { pk board_pk user_pk content }
        }
    }
"#;

const MY_BOARDS_QUERY: &str = r#"
    query ($token: String!) {
        myBoards(token: $token) { pk user_pk user_name title content isWrite comment { pk } }
    }
"#;

const ALL_BOARDS_QUERY: &str = r#"
    query { allBoards { pk user_name title createdAt isWrite comment { pk } } }
"#;

const CREATE_BOARD_QUERY: &str = r#"
    query ($token: String!, $title: String!, $content: String!) {
        createBoard(token: $token, title: $title, content: $content)
    }
"#;

const CREATE_BOARD_MUTATION: &str = r#"
    mutation ($token: String!, $title: String!, $content: String!) {
        createBoard(token: $token, title: $title, content: $content)
    }
"#;

const UPDATE_BOARD_MUTATION: &str = r#"
    mutation ($pk: Int!, $title: String, $content: String, $token: String!) {
        updateBoard(board_pk: $pk, title: $title, content: $content, token: $token)
    }
"#;

const DELETE_BOARD_MUTATION: &str = r#"
    mutation ($pk: Int!, $token: String!) {
        deleteBoard(board_pk: $pk, token: $token)
    }
"#;

const PAST: &str = "2020-01-01T00:00:00.000000Z";

struct TestApp {
    db: Database,
    schema: BoardSchema,
    jwt: JwtVerifier,
}

struct TestUser {
    pk: String,
    token: String,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::connect_in_memory().await.unwrap();
        db.migrate().await.unwrap();

        let jwt = JwtVerifier::new("test-secret", 3600);
        let verifier: Arc<dyn TokenVerifier> = Arc::new(jwt.clone());
        let schema = build_schema(SchemaDeps::from_database(&db, verifier));

        Self { db, schema, jwt }
    }

    async fn user(&self, name: &str) -> TestUser {
        let user = self.db.users().create(CreateUser::new(name)).await.unwrap();
        let token = self.jwt.issue(&user.pk, Some(name)).unwrap();
        TestUser { pk: user.pk, token }
    }

    async fn board(&self, owner: &TestUser, title: &str) -> BoardRecord {
        self.db
            .boards()
            .create(CreateBoard {
                user_pk: owner.pk.clone(),
                title: title.to_string(),
                content: format!("{} content", title),
            })
            .await
            .unwrap()
    }

    /// Move a board's timestamps into the past so later writes are visible
    async fn backdate(&self, board: &BoardRecord) -> BoardRecord {
        sqlx::query("UPDATE boards SET created_at = ?, updated_at = ? WHERE pk = ?")
            .bind(PAST)
            .bind(PAST)
            .bind(board.pk)
            .execute(self.db.pool())
            .await
            .unwrap();
        self.db.boards().get_by_id(board.pk).await.unwrap().unwrap()
    }

    async fn exec(&self, query: &str, variables: Value) -> Response {
        self.schema
            .execute(Request::new(query).variables(Variables::from_json(variables)))
            .await
    }
}

fn data(response: Response) -> Value {
    assert!(
        response.errors.is_empty(),
        "unexpected errors: {:?}",
        response.errors
    );
    response.data.into_json().unwrap()
}

fn error_code(response: &Response) -> String {
    let error = response
        .errors
        .first()
        .unwrap_or_else(|| panic!("expected an error, got {:?}", response.data));
    let code = error
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"))
        .cloned()
        .expect("error without code");
    match code {
        async_graphql::Value::String(s) => s,
        other => panic!("code is not a string: {:?}", other),
    }
}

// ============================================================================
// board
// ============================================================================

#[tokio::test]
async fn board_is_writable_for_its_owner() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let board = app.board(&alice, "hello").await;

    let result = data(
        app.exec(BOARD_QUERY, json!({ "pk": board.pk, "token": alice.token }))
            .await,
    );

    let b = &result["board"];
    assert_eq!(b["pk"], json!(board.pk));
    assert_eq!(b["user_pk"], json!(alice.pk));
    assert_eq!(b["user_name"], json!("alice"));
    assert_eq!(b["title"], json!("hello"));
    assert_eq!(b["content"], json!("hello content"));
    assert_eq!(b["isWrite"], json!(true));
    assert_eq!(b["comment"], json!([]));
    assert!(b["createdAt"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn board_is_not_writable_for_other_users() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let board = app.board(&alice, "hello").await;

    let result = data(
        app.exec(BOARD_QUERY, json!({ "pk": board.pk, "token": bob.token }))
            .await,
    );
    assert_eq!(result["board"]["isWrite"], json!(false));
}

#[tokio::test]
async fn board_without_token_has_no_ownership_flag() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let board = app.board(&alice, "hello").await;

    let result = data(app.exec(BOARD_QUERY, json!({ "pk": board.pk })).await);
    assert_eq!(result["board"]["title"], json!("hello"));
    assert_eq!(result["board"]["isWrite"], Value::Null);
}

#[tokio::test]
async fn board_includes_comments_in_order() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let board = app.board(&alice, "hello").await;

    for (author, text) in [(&bob, "first!"), (&alice, "thanks")] {
        app.db
            .comments()
            .create(CreateComment {
                board_pk: board.pk,
                user_pk: author.pk.clone(),
                content: text.to_string(),
            })
            .await
            .unwrap();
    }

    let result = data(app.exec(BOARD_QUERY, json!({ "pk": board.pk })).await);
    let comments = result["board"]["comment"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["content"], json!("first!"));
    assert_eq!(comments[0]["user_pk"], json!(bob.pk));
    assert_eq!(comments[0]["board_pk"], json!(board.pk));
    assert_eq!(comments[1]["content"], json!("thanks"));
}

#[tokio::test]
async fn missing_board_is_not_found() {
    let app = TestApp::new().await;
    let response = app.exec(BOARD_QUERY, json!({ "pk": 404 })).await;
    assert_eq!(error_code(&response), "NOT_FOUND");
    assert_eq!(response.errors[0].message, "Board not found");
}

#[tokio::test]
async fn board_with_invalid_token_is_unauthorized() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let board = app.board(&alice, "hello").await;

    let response = app
        .exec(BOARD_QUERY, json!({ "pk": board.pk, "token": "garbage" }))
        .await;
    assert_eq!(error_code(&response), "UNAUTHORIZED");
}

// ============================================================================
// myBoards
// ============================================================================

#[tokio::test]
async fn my_boards_returns_exactly_the_callers_boards() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    app.board(&alice, "a1").await;
    app.board(&bob, "b1").await;
    app.board(&alice, "a2").await;

    let result = data(
        app.exec(MY_BOARDS_QUERY, json!({ "token": alice.token }))
            .await,
    );
    let boards = result["myBoards"].as_array().unwrap();
    let titles: Vec<&str> = boards.iter().map(|b| b["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["a2", "a1"]);
    for board in boards {
        assert_eq!(board["user_pk"], json!(alice.pk));
        assert_eq!(board["user_name"], json!("alice"));
        assert_eq!(board["isWrite"], Value::Null);
        assert_eq!(board["comment"], Value::Null);
    }
}

#[tokio::test]
async fn my_boards_is_not_found_when_empty() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;

    let response = app
        .exec(MY_BOARDS_QUERY, json!({ "token": alice.token }))
        .await;
    assert_eq!(error_code(&response), "NOT_FOUND");
}

#[tokio::test]
async fn my_boards_for_unknown_user_is_not_found() {
    let app = TestApp::new().await;
    let token = app.jwt.issue("no-such-user", None).unwrap();

    let response = app.exec(MY_BOARDS_QUERY, json!({ "token": token })).await;
    assert_eq!(error_code(&response), "NOT_FOUND");
    assert_eq!(response.errors[0].message, "User not found");
}

// ============================================================================
// allBoards
// ============================================================================

#[tokio::test]
async fn all_boards_returns_five_newest_first() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    for i in 0..7 {
        let owner = if i % 2 == 0 { &alice } else { &bob };
        app.board(owner, &format!("post {}", i)).await;
    }

    let result = data(app.exec(ALL_BOARDS_QUERY, json!({})).await);
    let boards = result["allBoards"].as_array().unwrap();
    let titles: Vec<&str> = boards.iter().map(|b| b["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["post 6", "post 5", "post 4", "post 3", "post 2"]);

    let created: Vec<&str> = boards
        .iter()
        .map(|b| b["createdAt"].as_str().unwrap())
        .collect();
    assert!(created.windows(2).all(|w| w[0] >= w[1]));

    assert_eq!(boards[0]["user_name"], json!("alice"));
    assert_eq!(boards[1]["user_name"], json!("bob"));
    assert!(boards.iter().all(|b| b["isWrite"].is_null() && b["comment"].is_null()));
}

#[tokio::test]
async fn all_boards_is_not_found_when_empty() {
    let app = TestApp::new().await;
    let response = app.exec(ALL_BOARDS_QUERY, json!({})).await;
    assert_eq!(error_code(&response), "NOT_FOUND");
}

// ============================================================================
// createBoard
// ============================================================================

#[tokio::test]
async fn create_board_query_is_visible_in_my_boards() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;

    let result = data(
        app.exec(
            CREATE_BOARD_QUERY,
            json!({ "token": alice.token, "title": "new", "content": "fresh" }),
        )
        .await,
    );
    assert_eq!(result["createBoard"], json!(true));

    let result = data(
        app.exec(MY_BOARDS_QUERY, json!({ "token": alice.token }))
            .await,
    );
    assert_eq!(result["myBoards"][0]["title"], json!("new"));
    assert_eq!(result["myBoards"][0]["content"], json!("fresh"));
}

#[tokio::test]
async fn create_board_mutation_behaves_like_the_query() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;

    let result = data(
        app.exec(
            CREATE_BOARD_MUTATION,
            json!({ "token": alice.token, "title": "via mutation", "content": "c" }),
        )
        .await,
    );
    assert_eq!(result["createBoard"], json!(true));

    let boards = app.db.boards().list_by_user(&alice.pk).await.unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].title, "via mutation");
}

#[tokio::test]
async fn create_board_for_unknown_user_is_not_found() {
    let app = TestApp::new().await;
    let token = app.jwt.issue("no-such-user", None).unwrap();

    let response = app
        .exec(
            CREATE_BOARD_QUERY,
            json!({ "token": token, "title": "t", "content": "c" }),
        )
        .await;
    assert_eq!(error_code(&response), "NOT_FOUND");
    assert!(app.db.boards().list_recent(5).await.unwrap().is_empty());
}

// ============================================================================
// updateBoard
// ============================================================================

#[tokio::test]
async fn owner_can_update_board() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let board = app.board(&alice, "before").await;
    let board = app.backdate(&board).await;

    let result = data(
        app.exec(
            UPDATE_BOARD_MUTATION,
            json!({ "pk": board.pk, "title": "after", "content": "new content", "token": alice.token }),
        )
        .await,
    );
    assert_eq!(result["updateBoard"], json!(true));

    let stored = app.db.boards().get_by_id(board.pk).await.unwrap().unwrap();
    assert_eq!(stored.title, "after");
    assert_eq!(stored.content, "new content");
    assert_eq!(stored.created_at, board.created_at);
    assert!(stored.updated_at > board.updated_at);
}

#[tokio::test]
async fn update_keeps_omitted_fields() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let board = app.board(&alice, "before").await;

    data(
        app.exec(
            UPDATE_BOARD_MUTATION,
            json!({ "pk": board.pk, "content": "only content", "token": alice.token }),
        )
        .await,
    );

    let stored = app.db.boards().get_by_id(board.pk).await.unwrap().unwrap();
    assert_eq!(stored.title, "before");
    assert_eq!(stored.content, "only content");
}

#[tokio::test]
async fn update_without_fields_leaves_board_untouched() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let board = app.board(&alice, "still").await;
    let board = app.backdate(&board).await;

    let result = data(
        app.exec(
            UPDATE_BOARD_MUTATION,
            json!({ "pk": board.pk, "token": alice.token }),
        )
        .await,
    );
    assert_eq!(result["updateBoard"], json!(true));

    let stored = app.db.boards().get_by_id(board.pk).await.unwrap().unwrap();
    assert_eq!(stored, board);
}

#[tokio::test]
async fn update_without_fields_still_checks_ownership() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let mallory = app.user("mallory").await;
    let board = app.board(&alice, "mine").await;

    let response = app
        .exec(
            UPDATE_BOARD_MUTATION,
            json!({ "pk": board.pk, "token": mallory.token }),
        )
        .await;
    assert_eq!(error_code(&response), "FORBIDDEN");
}

#[tokio::test]
async fn non_owner_cannot_update_board() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let mallory = app.user("mallory").await;
    let board = app.board(&alice, "mine").await;

    let response = app
        .exec(
            UPDATE_BOARD_MUTATION,
            json!({ "pk": board.pk, "title": "pwned", "token": mallory.token }),
        )
        .await;
    assert_eq!(error_code(&response), "FORBIDDEN");

    let stored = app.db.boards().get_by_id(board.pk).await.unwrap().unwrap();
    assert_eq!(stored, board);
}

#[tokio::test]
async fn update_missing_board_is_not_found() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;

    let response = app
        .exec(
            UPDATE_BOARD_MUTATION,
            json!({ "pk": 99, "title": "x", "token": alice.token }),
        )
        .await;
    assert_eq!(error_code(&response), "NOT_FOUND");
}

// ============================================================================
// deleteBoard
// ============================================================================

#[tokio::test]
async fn owner_can_delete_board() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let board = app.board(&alice, "doomed").await;

    let result = data(
        app.exec(
            DELETE_BOARD_MUTATION,
            json!({ "pk": board.pk, "token": alice.token }),
        )
        .await,
    );
    assert_eq!(result["deleteBoard"], json!(true));

    let response = app.exec(BOARD_QUERY, json!({ "pk": board.pk })).await;
    assert_eq!(error_code(&response), "NOT_FOUND");
}

#[tokio::test]
async fn non_owner_cannot_delete_board() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let mallory = app.user("mallory").await;
    let board = app.board(&alice, "mine").await;

    let response = app
        .exec(
            DELETE_BOARD_MUTATION,
            json!({ "pk": board.pk, "token": mallory.token }),
        )
        .await;
    assert_eq!(error_code(&response), "FORBIDDEN");
    assert!(app.db.boards().get_by_id(board.pk).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_with_invalid_token_is_unauthorized() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let board = app.board(&alice, "mine").await;

    let forged = JwtVerifier::new("other-secret", 3600)
        .issue(&alice.pk, None)
        .unwrap();
    let response = app
        .exec(DELETE_BOARD_MUTATION, json!({ "pk": board.pk, "token": forged }))
        .await;
    assert_eq!(error_code(&response), "UNAUTHORIZED");
    assert!(app.db.boards().get_by_id(board.pk).await.unwrap().is_some());
}

// ============================================================================
// Store failures
// ============================================================================

#[tokio::test]
async fn keys_outside_the_int_range_are_database_errors() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;

    // 2^32 + 1 would read back as 1 if narrowed with a plain cast
    sqlx::query(
        "INSERT INTO boards (pk, user_pk, title, content, created_at, updated_at) \
         VALUES (?, ?, 'wide', 'c', ?, ?)",
    )
    .bind(4_294_967_297_i64)
    .bind(&alice.pk)
    .bind(PAST)
    .bind(PAST)
    .execute(app.db.pool())
    .await
    .unwrap();

    let response = app.exec(ALL_BOARDS_QUERY, json!({})).await;
    assert_eq!(error_code(&response), "DATABASE_ERROR");

    let response = app
        .exec(MY_BOARDS_QUERY, json!({ "token": alice.token }))
        .await;
    assert_eq!(error_code(&response), "DATABASE_ERROR");

    let response = app.exec(BOARD_QUERY, json!({ "pk": 1 })).await;
    assert_eq!(error_code(&response), "NOT_FOUND");
}

struct FailingBoardStore;

#[async_trait]
impl BoardStore for FailingBoardStore {
    async fn get(&self, _pk: i64) -> anyhow::Result<Option<BoardRecord>> {
        Err(anyhow!("connection reset"))
    }

    async fn list_by_user(&self, _user_pk: &str) -> anyhow::Result<Vec<BoardRecord>> {
        Err(anyhow!("connection reset"))
    }

    async fn list_recent(&self, _limit: i64) -> anyhow::Result<Vec<BoardRecord>> {
        Err(anyhow!("connection reset"))
    }

    async fn create(&self, _board: CreateBoard) -> anyhow::Result<BoardRecord> {
        Err(anyhow!("connection reset"))
    }

    async fn update(&self, _pk: i64, _update: UpdateBoard) -> anyhow::Result<Option<BoardRecord>> {
        Err(anyhow!("connection reset"))
    }

    async fn delete(&self, _pk: i64) -> anyhow::Result<bool> {
        Err(anyhow!("connection reset"))
    }
}

#[tokio::test]
async fn store_failures_surface_as_database_errors() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;

    let verifier: Arc<dyn TokenVerifier> = Arc::new(app.jwt.clone());
    let mut deps = SchemaDeps::from_database(&app.db, verifier);
    deps.boards = Arc::new(FailingBoardStore);
    let schema = build_schema(deps);

    let response = schema.execute(ALL_BOARDS_QUERY).await;
    assert_eq!(error_code(&response), "DATABASE_ERROR");
    assert_eq!(response.errors[0].message, "Database error: connection reset");

    let response = schema
        .execute(
            Request::new(CREATE_BOARD_QUERY).variables(Variables::from_json(
                json!({ "token": alice.token, "title": "t", "content": "c" }),
            )),
        )
        .await;
    assert_eq!(error_code(&response), "DATABASE_ERROR");
}
