//! API request/response models for comments.

use super::users::AuthorResponse;
use crate::db::models::comments::CommentDBResponse;
use crate::types::{CommentId, TweetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CommentCreate {
    /// Comment text; surrounding whitespace is trimmed
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: CommentId,
    pub tweet_id: TweetId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorResponse,
}

impl From<CommentDBResponse> for CommentResponse {
    fn from(db: CommentDBResponse) -> Self {
        Self {
            id: db.id,
            tweet_id: db.tweet_id,
            content: db.content,
            created_at: db.created_at,
            author: AuthorResponse {
                id: db.user_id,
                username: db.username,
            },
        }
    }
}
