//! Database models for tweets.

use crate::types::{TweetId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new tweet
#[derive(Debug, Clone)]
pub struct TweetCreateDBRequest {
    pub user_id: UserId,
    pub tweet: String,
}

/// Database response for a tweet, joined with its author and engagement counters
#[derive(Debug, Clone)]
pub struct TweetDBResponse {
    pub id: TweetId,
    pub tweet: String,
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub like_count: i64,
    pub comment_count: i64,
}
