//! Database access for likes.
//!
//! A like is a `(tweet_id, user_id)` row; its presence is the whole state. Likes don't go
//! through [`Repository`](super::Repository) since there is nothing to look up by ID.

use crate::db::errors::{DbError, Result};
use crate::types::{TweetId, UserId};
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, instrument};

pub struct Likes<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Likes<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Record a like. Returns `false` if the user had already liked the tweet.
    #[instrument(skip(self), err)]
    pub async fn like(&mut self, tweet_id: TweetId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("INSERT INTO likes (tweet_id, user_id, created_at) VALUES (?, ?, ?)")
            .bind(tweet_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *self.db)
            .await;

        match result.map_err(DbError::from) {
            Ok(_) => Ok(true),
            Err(DbError::UniqueViolation { .. }) => {
                debug!("Like already recorded");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Remove a like. Returns `false` if there was nothing to remove.
    #[instrument(skip(self), err)]
    pub async fn unlike(&mut self, tweet_id: TweetId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE tweet_id = ? AND user_id = ?")
            .bind(tweet_id)
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self, tweet_id: TweetId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE tweet_id = ?")
            .bind(tweet_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn is_liked(&mut self, tweet_id: TweetId, user_id: UserId) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM likes WHERE tweet_id = ? AND user_id = ?")
            .bind(tweet_id)
            .bind(user_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(found.is_some())
    }
}
