//! Database repository for users.

use crate::types::UserId;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
    /// Only users whose username or bio contains this (case-sensitive) substring
    pub query: Option<String>,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, query: None }
    }

    pub fn matching(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tweet_count: i64,
    pub like_count: i64,
}

impl From<User> for UserDBResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            bio: user.bio,
            created_at: user.created_at,
            updated_at: user.updated_at,
            tweet_count: user.tweet_count,
            like_count: user.like_count,
        }
    }
}

const SELECT_USERS: &str = r#"
    SELECT
        u.id, u.username, u.email, u.password_hash, u.bio, u.created_at, u.updated_at,
        (SELECT COUNT(*) FROM tweets t WHERE t.user_id = u.id) AS tweet_count,
        (SELECT COUNT(*) FROM likes l WHERE l.user_id = u.id) AS like_count
    FROM users u
"#;

pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();

        let user_id: UserId = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password_hash, bio, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&request.username)
        .bind(&request.email)
        .bind(request.password_hash.as_deref())
        .bind(request.bio.as_deref())
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.db)
        .await?;

        self.get_by_id(user_id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(user_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USERS} WHERE u.id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = String::from(SELECT_USERS);

        if filter.query.is_some() {
            query.push_str(" WHERE instr(u.username, ?1) > 0 OR instr(COALESCE(u.bio, ''), ?1) > 0");
            query.push_str(" ORDER BY u.created_at DESC, u.id DESC LIMIT ?2 OFFSET ?3");
        } else {
            query.push_str(" ORDER BY u.created_at DESC, u.id DESC LIMIT ?1 OFFSET ?2");
        }

        let mut sql_query = sqlx::query_as::<_, User>(&query);

        if let Some(q) = &filter.query {
            sql_query = sql_query.bind(q);
        }

        let users = sql_query
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users.into_iter().map(UserDBResponse::from).collect())
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Update the columns set in `request`. Fails with [`DbError::NotFound`] if the user is gone,
    /// and with [`DbError::UniqueViolation`] if the new username or email is taken.
    #[instrument(skip(self, request), fields(user_id = id), err)]
    pub async fn update(&mut self, id: UserId, request: &UserUpdateDBRequest) -> Result<UserDBResponse> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = COALESCE(?1, username),
                email = COALESCE(?2, email),
                bio = CASE WHEN ?3 IS NULL THEN bio ELSE NULLIF(?3, '') END,
                password_hash = COALESCE(?4, password_hash),
                updated_at = ?5
            WHERE id = ?6
            "#,
        )
        .bind(request.username.as_deref())
        .bind(request.email.as_deref())
        .bind(request.bio.as_deref())
        .bind(request.password_hash.as_deref())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USERS} WHERE u.email = ?"))
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }

    #[instrument(skip(self), err)]
    pub async fn get_user_by_username(&mut self, username: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USERS} WHERE u.username = ?"))
            .bind(username)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }
}
