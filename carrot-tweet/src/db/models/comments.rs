//! Database models for comments.

use crate::types::{CommentId, TweetId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new comment
#[derive(Debug, Clone)]
pub struct CommentCreateDBRequest {
    pub tweet_id: TweetId,
    pub user_id: UserId,
    pub content: String,
}

/// Database response for a comment, joined with its author's username
#[derive(Debug, Clone)]
pub struct CommentDBResponse {
    pub id: CommentId,
    pub content: String,
    pub tweet_id: TweetId,
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
