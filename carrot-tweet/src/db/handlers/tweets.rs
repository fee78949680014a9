//! Database repository for tweets.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::tweets::{TweetCreateDBRequest, TweetDBResponse},
};
use crate::types::{TweetId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing tweets, newest first
#[derive(Debug, Clone)]
pub struct TweetFilter {
    pub skip: i64,
    pub limit: i64,
    /// Only tweets written by this user
    pub author: Option<UserId>,
    /// Only tweets whose text contains this (case-sensitive) substring
    pub contains: Option<String>,
}

impl TweetFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            author: None,
            contains: None,
        }
    }

    pub fn by_author(mut self, author: UserId) -> Self {
        self.author = Some(author);
        self
    }

    pub fn containing(mut self, text: impl Into<String>) -> Self {
        self.contains = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, FromRow)]
struct Tweet {
    pub id: TweetId,
    pub tweet: String,
    pub user_id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub like_count: i64,
    pub comment_count: i64,
}

impl From<Tweet> for TweetDBResponse {
    fn from(tweet: Tweet) -> Self {
        Self {
            id: tweet.id,
            tweet: tweet.tweet,
            user_id: tweet.user_id,
            username: tweet.username,
            created_at: tweet.created_at,
            updated_at: tweet.updated_at,
            like_count: tweet.like_count,
            comment_count: tweet.comment_count,
        }
    }
}

const SELECT_TWEETS: &str = r#"
    SELECT
        t.id, t.tweet, t.user_id, u.username, t.created_at, t.updated_at,
        (SELECT COUNT(*) FROM likes l WHERE l.tweet_id = t.id) AS like_count,
        (SELECT COUNT(*) FROM comments c WHERE c.tweet_id = t.id) AS comment_count
    FROM tweets t
    INNER JOIN users u ON u.id = t.user_id
"#;

pub struct Tweets<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Tweets<'c> {
    type CreateRequest = TweetCreateDBRequest;
    type Response = TweetDBResponse;
    type Id = TweetId;
    type Filter = TweetFilter;

    #[instrument(skip(self, request), fields(user_id = request.user_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();

        let tweet_id: TweetId = sqlx::query_scalar(
            r#"
            INSERT INTO tweets (tweet, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&request.tweet)
        .bind(request.user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        self.get_by_id(tweet_id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(tweet_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!("{SELECT_TWEETS} WHERE t.id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(tweet.map(TweetDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = String::from(SELECT_TWEETS);
        let mut conditions = Vec::new();

        if filter.author.is_some() {
            conditions.push("t.user_id = ?");
        }
        if filter.contains.is_some() {
            conditions.push("instr(t.tweet, ?) > 0");
        }
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        // id breaks ties between tweets created within the same instant
        query.push_str(" ORDER BY t.created_at DESC, t.id DESC LIMIT ? OFFSET ?");

        let mut sql_query = sqlx::query_as::<_, Tweet>(&query);

        if let Some(author) = filter.author {
            sql_query = sql_query.bind(author);
        }
        if let Some(contains) = &filter.contains {
            sql_query = sql_query.bind(contains);
        }

        let tweets = sql_query
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(tweets.into_iter().map(TweetDBResponse::from).collect())
    }
}

impl<'c> Tweets<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Whether a tweet with this ID exists, without loading it.
    #[instrument(skip(self), fields(tweet_id = id), err)]
    pub async fn exists(&mut self, id: TweetId) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM tweets WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_user, insert_tweet_at};
    use chrono::Duration;
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_tweet(pool: SqlitePool) {
        let author = create_test_user(&pool, "writer").await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Tweets::new(&mut conn);

        let created = repo
            .create(&TweetCreateDBRequest {
                user_id: author.id,
                tweet: "first carrot of the season".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.tweet, "first carrot of the season");
        assert_eq!(created.username, "writer");
        assert_eq!(created.like_count, 0);
        assert_eq!(created.comment_count, 0);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert!(repo.exists(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id + 100).await.unwrap().is_none());
        assert!(!repo.exists(created.id + 100).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_tweet_for_unknown_user_is_rejected(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Tweets::new(&mut conn);

        let result = repo
            .create(&TweetCreateDBRequest {
                user_id: 12345,
                tweet: "ghost".to_string(),
            })
            .await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_is_newest_first_and_windowed(pool: SqlitePool) {
        let author = create_test_user(&pool, "writer").await;
        let base = Utc::now() - Duration::hours(1);
        for i in 0..5 {
            insert_tweet_at(&pool, author.id, &format!("tweet {i}"), base + Duration::minutes(i)).await;
        }

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Tweets::new(&mut conn);

        let first_page = repo.list(&TweetFilter::new(0, 2)).await.unwrap();
        let texts: Vec<_> = first_page.iter().map(|t| t.tweet.as_str()).collect();
        assert_eq!(texts, vec!["tweet 4", "tweet 3"]);

        let last_page = repo.list(&TweetFilter::new(4, 2)).await.unwrap();
        let texts: Vec<_> = last_page.iter().map(|t| t.tweet.as_str()).collect();
        assert_eq!(texts, vec!["tweet 0"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters(pool: SqlitePool) {
        let alice = create_test_user(&pool, "alice").await;
        let bob = create_test_user(&pool, "bob").await;
        let base = Utc::now() - Duration::hours(1);
        insert_tweet_at(&pool, alice.id, "Carrots are great", base).await;
        insert_tweet_at(&pool, alice.id, "so are turnips", base + Duration::minutes(1)).await;
        insert_tweet_at(&pool, bob.id, "I like Carrots too", base + Duration::minutes(2)).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Tweets::new(&mut conn);

        let by_alice = repo.list(&TweetFilter::new(0, 10).by_author(alice.id)).await.unwrap();
        assert_eq!(by_alice.len(), 2);
        assert!(by_alice.iter().all(|t| t.user_id == alice.id));

        let carrots = repo.list(&TweetFilter::new(0, 10).containing("Carrots")).await.unwrap();
        let texts: Vec<_> = carrots.iter().map(|t| t.tweet.as_str()).collect();
        assert_eq!(texts, vec!["I like Carrots too", "Carrots are great"]);

        // Matching is case-sensitive
        let lowercase = repo.list(&TweetFilter::new(0, 10).containing("carrots")).await.unwrap();
        assert!(lowercase.is_empty());

        let both = repo
            .list(&TweetFilter::new(0, 10).by_author(bob.id).containing("Carrots"))
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].username, "bob");
    }
}
