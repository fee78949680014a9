use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::{
        extract::AppJson,
        handlers::tweets::{ensure_tweet_exists, tweet_id_from_path},
        models::{
            comments::{CommentCreate, CommentResponse},
            users::CurrentUser,
        },
    },
    db::handlers::{Comments, Repository, Tweets, comments::CommentFilter},
    db::models::comments::CommentCreateDBRequest,
    errors::{Error, FieldErrors},
    types::parse_path_id,
};

/// Comments on a tweet, newest first
#[utoipa::path(
    get,
    path = "/tweets/{id}/comments",
    tag = "comments",
    params(("id" = i64, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Comments on the tweet", body = [CommentResponse]),
        (status = 404, description = "Tweet not found", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_comments(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Vec<CommentResponse>>, Error> {
    let tweet_id = tweet_id_from_path(&id)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    ensure_tweet_exists(&mut Tweets::new(&mut pool_conn), tweet_id).await?;

    let comments = Comments::new(&mut pool_conn).list(&CommentFilter::for_tweet(tweet_id)).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

/// Comment on a tweet
#[utoipa::path(
    post,
    path = "/tweets/{id}/comments",
    tag = "comments",
    params(("id" = i64, Path, description = "Tweet ID")),
    request_body = CommentCreate,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Empty comment", body = crate::errors::ErrorBody),
        (status = 401, description = "Not logged in", body = crate::errors::ErrorBody),
        (status = 404, description = "Tweet not found", body = crate::errors::ErrorBody),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn create_comment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    AppJson(request): AppJson<CommentCreate>,
) -> Result<(StatusCode, Json<CommentResponse>), Error> {
    let tweet_id = tweet_id_from_path(&id)?;

    let content = request.content.trim();
    let mut errors = FieldErrors::new();
    if content.is_empty() {
        errors.add("content", "Comment cannot be empty");
    }
    errors.into_result("Invalid comment")?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    ensure_tweet_exists(&mut Tweets::new(&mut pool_conn), tweet_id).await?;

    let comment = Comments::new(&mut pool_conn)
        .create(&CommentCreateDBRequest {
            tweet_id,
            user_id: current_user.id,
            content: content.to_string(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// Delete one of your own comments
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    tag = "comments",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Not logged in", body = crate::errors::ErrorBody),
        (status = 403, description = "Not the author", body = crate::errors::ErrorBody),
        (status = 404, description = "Comment not found", body = crate::errors::ErrorBody),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn delete_comment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, Error> {
    let not_found = || Error::NotFound {
        resource: "Comment".to_string(),
        id: id.clone(),
    };
    let comment_id = parse_path_id(&id).ok_or_else(not_found)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut comments = Comments::new(&mut pool_conn);

    let comment = comments.get_by_id(comment_id).await?.ok_or_else(not_found)?;
    if comment.user_id != current_user.id {
        return Err(Error::Forbidden {
            message: "You can only delete your own comments".to_string(),
        });
    }

    if !comments.delete(comment_id).await? {
        return Err(not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}
