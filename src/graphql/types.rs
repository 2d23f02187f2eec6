//! GraphQL type definitions
//!
//! These types mirror the database records but are decorated with
//! async-graphql attributes. Field names follow the published schema, which
//! mixes snake_case keys with camelCase timestamps.

use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, SimpleObject, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::sqlite_helpers::{datetime_to_str, str_to_datetime};

/// Timestamp serialized as an RFC 3339 string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Date(pub DateTime<Utc>);

#[Scalar(name = "Date")]
impl ScalarType for Date {
    fn parse(value: Value) -> InputValueResult<Self> {
        if let Value::String(s) = &value {
            str_to_datetime(s)
                .map(Date)
                .map_err(|e| InputValueError::custom(e.to_string()))
        } else {
            Err(InputValueError::expected_type(value))
        }
    }

    fn to_value(&self) -> Value {
        Value::String(datetime_to_str(self.0))
    }
}

impl From<DateTime<Utc>> for Date {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// A comment attached to a board
#[derive(Debug, Clone, SimpleObject, Serialize, Deserialize)]
pub struct Comment {
    pub pk: i32,
    #[graphql(name = "board_pk")]
    pub board_pk: i32,
    #[graphql(name = "user_pk")]
    pub user_pk: String,
    pub content: String,
    pub created_at: Date,
    pub updated_at: Date,
}

/// A forum board post
#[derive(Debug, Clone, SimpleObject, Serialize, Deserialize)]
pub struct Board {
    pub pk: i32,
    /// Key of the owning user
    #[graphql(name = "user_pk")]
    pub user_pk: String,
    /// Display name of the owning user
    #[graphql(name = "user_name")]
    pub user_name: String,
    pub title: String,
    pub content: String,
    pub created_at: Date,
    pub updated_at: Date,
    /// Whether the requesting user owns this board; null when not computed
    #[graphql(name = "isWrite")]
    pub is_write: Option<bool>,
    /// Comments on the board; null when not loaded
    pub comment: Option<Vec<Option<Comment>>>,
}
