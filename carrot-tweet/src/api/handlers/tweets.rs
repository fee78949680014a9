use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::extract::{AppJson, AppQuery},
    api::models::{
        pagination::{PageQuery, PageResponse},
        tweets::{TweetCreate, TweetDetailResponse, TweetResponse},
        users::CurrentUser,
    },
    auth::current_user::MaybeCurrentUser,
    db::handlers::{Likes, Repository, Tweets, tweets::TweetFilter},
    db::models::tweets::TweetCreateDBRequest,
    errors::{Error, FieldErrors},
    types::{TweetId, parse_path_id},
};

/// Resolve a `{id}` path segment to a tweet ID; anything unparseable is a missing tweet.
pub(crate) fn tweet_id_from_path(raw: &str) -> Result<TweetId, Error> {
    parse_path_id(raw).ok_or_else(|| Error::NotFound {
        resource: "Tweet".to_string(),
        id: raw.to_string(),
    })
}

/// Fail with 404 unless the tweet exists.
pub(crate) async fn ensure_tweet_exists(tweets: &mut Tweets<'_>, id: TweetId) -> Result<(), Error> {
    if tweets.exists(id).await? {
        Ok(())
    } else {
        Err(Error::NotFound {
            resource: "Tweet".to_string(),
            id: id.to_string(),
        })
    }
}

/// The home feed, newest first
#[utoipa::path(
    get,
    path = "/tweets",
    tag = "tweets",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of the feed", body = PageResponse<TweetResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_tweets(State(state): State<AppState>, AppQuery(query): AppQuery<PageQuery>) -> Result<Json<PageResponse<TweetResponse>>, Error> {
    let page_size = i64::from(state.config.feed.page_size);
    let page = query.page();

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let rows = Tweets::new(&mut pool_conn)
        .list(&TweetFilter::new(query.skip(page_size), page_size + 1))
        .await?;

    let rows: Vec<TweetResponse> = rows.into_iter().map(TweetResponse::from).collect();
    Ok(Json(PageResponse::from_lookahead(rows, page, page_size)))
}

/// Post a tweet
#[utoipa::path(
    post,
    path = "/tweets",
    tag = "tweets",
    request_body = TweetCreate,
    responses(
        (status = 201, description = "Tweet created", body = TweetResponse),
        (status = 400, description = "Empty or too long", body = crate::errors::ErrorBody),
        (status = 401, description = "Not logged in", body = crate::errors::ErrorBody),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn create_tweet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    AppJson(request): AppJson<TweetCreate>,
) -> Result<(StatusCode, Json<TweetResponse>), Error> {
    let text = request.tweet.trim();
    let max_length = state.config.feed.max_tweet_length;

    let mut errors = FieldErrors::new();
    if text.is_empty() {
        errors.add("tweet", "Tweet cannot be empty");
    } else if text.chars().count() > max_length {
        errors.add("tweet", format!("Tweet must be at most {max_length} characters long"));
    }
    errors.into_result("Invalid tweet")?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let tweet = Tweets::new(&mut pool_conn)
        .create(&TweetCreateDBRequest {
            user_id: current_user.id,
            tweet: text.to_string(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TweetResponse::from(tweet))))
}

/// A single tweet, with the viewer's relationship to it
#[utoipa::path(
    get,
    path = "/tweets/{id}",
    tag = "tweets",
    params(("id" = i64, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Tweet detail", body = TweetDetailResponse),
        (status = 404, description = "Tweet not found", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_tweet(
    State(state): State<AppState>,
    viewer: MaybeCurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TweetDetailResponse>, Error> {
    let id = tweet_id_from_path(&id)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let tweet = Tweets::new(&mut pool_conn).get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Tweet".to_string(),
        id: id.to_string(),
    })?;

    let is_liked = match viewer.id() {
        Some(user_id) => Likes::new(&mut pool_conn).is_liked(id, user_id).await?,
        None => false,
    };

    Ok(Json(TweetDetailResponse {
        is_owner: viewer.id() == Some(tweet.user_id),
        is_liked,
        tweet: TweetResponse::from(tweet),
    }))
}
