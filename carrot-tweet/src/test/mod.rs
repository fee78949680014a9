//! End-to-end tests through the full router: CORS, tracing and every route.

use crate::{
    api::models::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        comments::{CommentCreate, CommentResponse},
        likes::LikeStatus,
        pagination::PageResponse,
        search::SearchResponse,
        tweets::{TweetCreate, TweetDetailResponse, TweetResponse},
        users::{ProfileResponse, ProfileUpdate, ProfileUpdateResponse, UserResponse},
    },
    errors::ErrorBody,
    test_utils::create_test_app,
};
use axum::http::{HeaderValue, StatusCode, header};
use axum_test::{TestResponse, TestServer};
use sqlx::SqlitePool;

/// The `name=value` part of the response's `Set-Cookie` header.
fn session_from(response: &TestResponse) -> String {
    let set_cookie = response.header(header::SET_COOKIE);
    let set_cookie = set_cookie.to_str().expect("Set-Cookie is ASCII");
    set_cookie.split(';').next().expect("cookie pair").to_string()
}

async fn register(server: &TestServer, username: &str) -> (UserResponse, String) {
    let response = server
        .post("/authentication/register")
        .json(&RegisterRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "carrots123".to_string(),
            confirm_password: "carrots123".to_string(),
        })
        .await;
    response.assert_status(StatusCode::CREATED);

    let cookie = session_from(&response);
    let body: AuthResponse = response.json();
    (body.user, cookie)
}

#[sqlx::test]
#[test_log::test]
async fn test_health_and_docs(pool: SqlitePool) {
    let server = create_test_app(pool).await;

    let health = server.get("/healthz").await;
    health.assert_status_ok();
    assert_eq!(health.text(), "OK");

    let spec = server.get("/openapi.json").await;
    spec.assert_status_ok();
    assert!(spec.text().contains("Carrot Tweet API"));

    server.get("/docs").await.assert_status_ok();
}

#[sqlx::test]
#[test_log::test]
async fn test_signup_once_per_email(pool: SqlitePool) {
    let server = create_test_app(pool).await;
    let (user, cookie) = register(&server, "carrot").await;

    let me: UserResponse = server.get("/authentication/me").add_header("cookie", &cookie).await.json();
    assert_eq!(me.id, user.id);

    let duplicate = server
        .post("/authentication/register")
        .json(&RegisterRequest {
            username: "another".to_string(),
            email: "Carrot@Example.com".to_string(),
            password: "carrots123".to_string(),
            confirm_password: "carrots123".to_string(),
        })
        .await;
    duplicate.assert_status(StatusCode::BAD_REQUEST);
    let body: ErrorBody = duplicate.json();
    assert!(body.field_errors.get("email").is_some());
}

#[sqlx::test]
#[test_log::test]
async fn test_login_logout_round_trip(pool: SqlitePool) {
    let server = create_test_app(pool).await;
    register(&server, "carrot").await;

    let login = server
        .post("/authentication/login")
        .json(&LoginRequest {
            email: "carrot@example.com".to_string(),
            password: "carrots123".to_string(),
        })
        .await;
    login.assert_status_ok();
    let cookie = session_from(&login);
    server.get("/authentication/me").add_header("cookie", &cookie).await.assert_status_ok();

    let logout = server.post("/authentication/logout").add_header("cookie", &cookie).await;
    logout.assert_status_ok();
    let cleared = logout.header(header::SET_COOKIE);
    assert!(cleared.to_str().unwrap().contains("Max-Age=0"));

    // The stateless cookie itself stays valid until it expires; a browser drops it on logout
    server.get("/authentication/me").await.assert_status(StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
#[test_log::test]
async fn test_user_journey(pool: SqlitePool) {
    let server = create_test_app(pool).await;
    let (author, author_cookie) = register(&server, "carrot").await;
    let (_, fan_cookie) = register(&server, "parsnip").await;

    // Post
    let tweet: TweetResponse = server
        .post("/tweets")
        .add_header("cookie", &author_cookie)
        .json(&TweetCreate {
            tweet: "Carrots are the best root".to_string(),
        })
        .await
        .json();
    assert_eq!(tweet.author.username, "carrot");

    let feed: PageResponse<TweetResponse> = server.get("/tweets").await.json();
    assert_eq!(feed.data.len(), 1);
    assert!(!feed.has_more);

    // Like, then unlike
    let like_path = format!("/tweets/{}/like", tweet.id);
    let liked: LikeStatus = server.post(&like_path).add_header("cookie", &fan_cookie).await.json();
    assert_eq!(liked.like_count, 1);

    let detail: TweetDetailResponse = server
        .get(&format!("/tweets/{}", tweet.id))
        .add_header("cookie", &fan_cookie)
        .await
        .json();
    assert!(detail.is_liked);
    assert!(!detail.is_owner);

    let unliked: LikeStatus = server.delete(&like_path).add_header("cookie", &fan_cookie).await.json();
    assert_eq!(unliked.like_count, 0);

    // Comment
    let comments_path = format!("/tweets/{}/comments", tweet.id);
    let comment: CommentResponse = server
        .post(&comments_path)
        .add_header("cookie", &fan_cookie)
        .json(&CommentCreate {
            content: "Parsnips disagree".to_string(),
        })
        .await
        .json();
    let comments: Vec<CommentResponse> = server.get(&comments_path).await.json();
    assert_eq!(comments[0].id, comment.id);

    server
        .delete(&format!("/comments/{}", comment.id))
        .add_header("cookie", &author_cookie)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // Profile
    let profile: ProfileResponse = server
        .get("/users/carrot")
        .add_header("cookie", &author_cookie)
        .await
        .json();
    assert!(profile.is_owner);
    assert_eq!(profile.tweet_count, 1);

    let updated: ProfileUpdateResponse = server
        .patch(&format!("/users/{}", author.id))
        .add_header("cookie", &author_cookie)
        .json(&ProfileUpdate {
            username: "carrot_king".to_string(),
            bio: Some("Root vegetable enthusiast".to_string()),
            ..Default::default()
        })
        .await
        .json();
    assert_eq!(updated.username, "carrot_king");

    let user_tweets: PageResponse<TweetResponse> = server.get("/users/carrot_king/tweets").await.json();
    assert_eq!(user_tweets.data[0].id, tweet.id);
    server.get("/users/carrot").await.assert_status(StatusCode::NOT_FOUND);

    // Search
    let found: SearchResponse = server
        .get("/search")
        .add_query_param("q", "enthusiast")
        .await
        .json();
    assert!(found.tweets.is_empty());
    assert_eq!(found.users.len(), 1);
    assert_eq!(found.users[0].username, "carrot_king");
}

#[sqlx::test]
#[test_log::test]
async fn test_tampered_cookie_is_anonymous(pool: SqlitePool) {
    let server = create_test_app(pool).await;
    let (_, cookie) = register(&server, "carrot").await;

    let mut tampered = cookie.clone();
    tampered.push('x');

    server
        .get("/authentication/me")
        .add_header("cookie", &tampered)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/tweets")
        .add_header("cookie", &tampered)
        .json(&TweetCreate {
            tweet: "sneaky".to_string(),
        })
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

/// Status and JSON error body of a response the extractors rejected.
fn rejected(response: &TestResponse) -> ErrorBody {
    response.assert_status(StatusCode::BAD_REQUEST);
    let content_type = response.header(header::CONTENT_TYPE);
    assert_eq!(content_type, HeaderValue::from_static("application/json"));
    response.json()
}

#[sqlx::test]
#[test_log::test]
async fn test_malformed_requests_get_json_errors(pool: SqlitePool) {
    let server = create_test_app(pool).await;
    let (_, cookie) = register(&server, "carrot").await;

    // Not JSON at all
    let response = server
        .post("/authentication/login")
        .text("{not json")
        .content_type("application/json")
        .await;
    assert!(rejected(&response).message.starts_with("Invalid request body"));

    // Well-formed JSON with a wrongly typed field
    let response = server
        .post("/authentication/login")
        .json(&serde_json::json!({ "email": 5, "password": "carrots123" }))
        .await;
    assert!(rejected(&response).message.starts_with("Invalid request body"));

    // JSON sent without a JSON content type
    let response = server
        .post("/tweets")
        .add_header("cookie", &cookie)
        .text(r#"{"tweet": "hello"}"#)
        .await;
    assert!(rejected(&response).message.starts_with("Invalid request body"));

    let response = server
        .patch("/users/1")
        .add_header("cookie", &cookie)
        .text("42")
        .content_type("application/json")
        .await;
    rejected(&response);

    // Query strings that don't parse
    let response = server.get("/tweets").add_query_param("page", "abc").await;
    assert!(rejected(&response).message.starts_with("Invalid query parameters"));

    let response = server.get("/users/carrot/tweets").add_query_param("page", "1.5").await;
    assert!(rejected(&response).message.starts_with("Invalid query parameters"));

    // Nothing was created along the way
    let feed: PageResponse<TweetResponse> = server.get("/tweets").await.json();
    assert!(feed.data.is_empty());
}

#[sqlx::test]
#[test_log::test]
async fn test_cors_preflight(pool: SqlitePool) {
    let server = create_test_app(pool).await;

    let response = server
        .method(axum::http::Method::OPTIONS, "/tweets")
        .add_header("origin", "http://localhost:3000")
        .add_header("access-control-request-method", "POST")
        .await;

    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        HeaderValue::from_static("http://localhost:3000")
    );
    assert_eq!(
        response.header(header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
        HeaderValue::from_static("true")
    );
}
