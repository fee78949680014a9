//! API request/response models for tweets.

use super::users::AuthorResponse;
use crate::db::models::tweets::TweetDBResponse;
use crate::types::TweetId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TweetCreate {
    /// Tweet text; surrounding whitespace is trimmed
    pub tweet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TweetResponse {
    pub id: TweetId,
    pub tweet: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorResponse,
    pub like_count: i64,
    pub comment_count: i64,
}

impl From<TweetDBResponse> for TweetResponse {
    fn from(db: TweetDBResponse) -> Self {
        Self {
            id: db.id,
            tweet: db.tweet,
            created_at: db.created_at,
            author: AuthorResponse {
                id: db.user_id,
                username: db.username,
            },
            like_count: db.like_count,
            comment_count: db.comment_count,
        }
    }
}

/// A single tweet as seen by a particular viewer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TweetDetailResponse {
    #[serde(flatten)]
    pub tweet: TweetResponse,
    /// Whether the viewer wrote this tweet
    pub is_owner: bool,
    /// Whether the viewer has liked this tweet
    pub is_liked: bool,
}
