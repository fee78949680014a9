use axum::{
    Json,
    extract::{Path, State},
};
use tracing::debug;

use crate::{
    AppState,
    api::{
        handlers::tweets::{ensure_tweet_exists, tweet_id_from_path},
        models::{likes::LikeStatus, users::CurrentUser},
    },
    auth::current_user::MaybeCurrentUser,
    db::handlers::{Likes, Tweets},
    errors::Error,
};

/// Like a tweet. Liking twice is a no-op.
#[utoipa::path(
    post,
    path = "/tweets/{id}/like",
    tag = "likes",
    params(("id" = i64, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Tweet liked", body = LikeStatus),
        (status = 401, description = "Not logged in", body = crate::errors::ErrorBody),
        (status = 404, description = "Tweet not found", body = crate::errors::ErrorBody),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn like_tweet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<LikeStatus>, Error> {
    let tweet_id = tweet_id_from_path(&id)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    ensure_tweet_exists(&mut Tweets::new(&mut pool_conn), tweet_id).await?;

    let mut likes = Likes::new(&mut pool_conn);
    if !likes.like(tweet_id, current_user.id).await? {
        debug!("Tweet {} was already liked", tweet_id);
    }

    Ok(Json(LikeStatus {
        tweet_id,
        is_liked: true,
        like_count: likes.count(tweet_id).await?,
    }))
}

/// Remove a like. Unliking a tweet that wasn't liked is a no-op.
#[utoipa::path(
    delete,
    path = "/tweets/{id}/like",
    tag = "likes",
    params(("id" = i64, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Like removed", body = LikeStatus),
        (status = 401, description = "Not logged in", body = crate::errors::ErrorBody),
        (status = 404, description = "Tweet not found", body = crate::errors::ErrorBody),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn unlike_tweet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<LikeStatus>, Error> {
    let tweet_id = tweet_id_from_path(&id)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    ensure_tweet_exists(&mut Tweets::new(&mut pool_conn), tweet_id).await?;

    let mut likes = Likes::new(&mut pool_conn);
    likes.unlike(tweet_id, current_user.id).await?;

    Ok(Json(LikeStatus {
        tweet_id,
        is_liked: false,
        like_count: likes.count(tweet_id).await?,
    }))
}

/// Like button state for the viewer
#[utoipa::path(
    get,
    path = "/tweets/{id}/like",
    tag = "likes",
    params(("id" = i64, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Like status", body = LikeStatus),
        (status = 404, description = "Tweet not found", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_like_status(
    State(state): State<AppState>,
    viewer: MaybeCurrentUser,
    Path(id): Path<String>,
) -> Result<Json<LikeStatus>, Error> {
    let tweet_id = tweet_id_from_path(&id)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    ensure_tweet_exists(&mut Tweets::new(&mut pool_conn), tweet_id).await?;

    let mut likes = Likes::new(&mut pool_conn);
    let is_liked = match viewer.id() {
        Some(user_id) => likes.is_liked(tweet_id, user_id).await?,
        None => false,
    };

    Ok(Json(LikeStatus {
        tweet_id,
        is_liked,
        like_count: likes.count(tweet_id).await?,
    }))
}
