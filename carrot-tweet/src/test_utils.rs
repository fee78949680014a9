//! Helpers shared by the unit and HTTP tests.

use crate::{
    auth::{password, session},
    config::Config,
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
    types::{TweetId, UserId},
};
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Password of every user made by [`create_test_user`]
pub const TEST_PASSWORD: &str = "password123";

pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    let config = create_test_config();

    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-testing-only-0123456789".to_string()),
        ..Default::default()
    };

    // Fast hashing for tests
    config.auth.password.argon2_memory_kib = 128;
    config.auth.password.argon2_iterations = 1;
    config.auth.password.argon2_parallelism = 1;
    config.auth.session.cookie_secure = false;
    config.database.max_connections = 1;

    config
}

/// Create a user named `username` with email `{username}@example.com` and password [`TEST_PASSWORD`].
pub async fn create_test_user(pool: &SqlitePool, username: &str) -> UserDBResponse {
    let params = password::Argon2Params::from(&create_test_config().auth.password);
    let password_hash = password::hash_string_with_params(TEST_PASSWORD, Some(params)).expect("Failed to hash password");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users = Users::new(&mut conn);
    users
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: Some(password_hash),
            bio: None,
        })
        .await
        .expect("Failed to create test user")
}

/// Insert a tweet with an explicit timestamp, for tests that depend on ordering.
pub async fn insert_tweet_at(pool: &SqlitePool, user_id: UserId, text: &str, created_at: DateTime<Utc>) -> TweetId {
    sqlx::query_scalar("INSERT INTO tweets (tweet, user_id, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING id")
        .bind(text)
        .bind(user_id)
        .bind(created_at)
        .bind(created_at)
        .fetch_one(pool)
        .await
        .expect("Failed to insert test tweet")
}

/// `Cookie` header value carrying a valid session for `user_id`.
pub fn session_cookie(user_id: UserId) -> String {
    let config = create_test_config();
    let token = session::create_session_token(user_id, &config).expect("Failed to create session token");
    format!("{}={}", config.auth.session.cookie_name, token)
}
