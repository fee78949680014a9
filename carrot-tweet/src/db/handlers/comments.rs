//! Database repository for comments.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::comments::{CommentCreateDBRequest, CommentDBResponse},
};
use crate::types::{CommentId, TweetId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing the comments on one tweet
#[derive(Debug, Clone)]
pub struct CommentFilter {
    pub tweet_id: TweetId,
}

impl CommentFilter {
    pub fn for_tweet(tweet_id: TweetId) -> Self {
        Self { tweet_id }
    }
}

#[derive(Debug, Clone, FromRow)]
struct Comment {
    pub id: CommentId,
    pub content: String,
    pub tweet_id: TweetId,
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentDBResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            tweet_id: comment.tweet_id,
            user_id: comment.user_id,
            username: comment.username,
            created_at: comment.created_at,
        }
    }
}

const SELECT_COMMENTS: &str = r#"
    SELECT c.id, c.content, c.tweet_id, c.user_id, u.username, c.created_at
    FROM comments c
    INNER JOIN users u ON u.id = c.user_id
"#;

pub struct Comments<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Comments<'c> {
    type CreateRequest = CommentCreateDBRequest;
    type Response = CommentDBResponse;
    type Id = CommentId;
    type Filter = CommentFilter;

    #[instrument(skip(self, request), fields(tweet_id = request.tweet_id, user_id = request.user_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let comment_id: CommentId = sqlx::query_scalar(
            r#"
            INSERT INTO comments (content, tweet_id, user_id, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&request.content)
        .bind(request.tweet_id)
        .bind(request.user_id)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        self.get_by_id(comment_id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(comment_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let comment = sqlx::query_as::<_, Comment>(&format!("{SELECT_COMMENTS} WHERE c.id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(comment.map(CommentDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(tweet_id = filter.tweet_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "{SELECT_COMMENTS} WHERE c.tweet_id = ? ORDER BY c.created_at DESC, c.id DESC"
        ))
        .bind(filter.tweet_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(comments.into_iter().map(CommentDBResponse::from).collect())
    }
}

impl<'c> Comments<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Delete a comment, returning whether a row was removed.
    #[instrument(skip(self), fields(comment_id = id), err)]
    pub async fn delete(&mut self, id: CommentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
