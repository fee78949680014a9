use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    api::extract::{AppJson, AppQuery},
    api::models::{
        pagination::{PageQuery, PageResponse},
        tweets::TweetResponse,
        users::{CurrentUser, ProfileResponse, ProfileUpdate, ProfileUpdateResponse},
        validation,
    },
    auth::{current_user::MaybeCurrentUser, password},
    db::{
        handlers::{Repository, Tweets, Users, tweets::TweetFilter},
        models::users::{UserDBResponse, UserUpdateDBRequest},
    },
    errors::{Error, FieldErrors},
    types::parse_path_id,
};

fn user_not_found(key: &str) -> Error {
    Error::NotFound {
        resource: "User".to_string(),
        id: key.to_string(),
    }
}

async fn find_by_username(users: &mut Users<'_>, username: &str) -> Result<UserDBResponse, Error> {
    users
        .get_user_by_username(username)
        .await?
        .ok_or_else(|| user_not_found(username))
}

/// A user's public profile
#[utoipa::path(
    get,
    path = "/users/{username}",
    tag = "users",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(username = %username))]
pub async fn get_profile(
    State(state): State<AppState>,
    viewer: MaybeCurrentUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = find_by_username(&mut Users::new(&mut pool_conn), &username).await?;

    Ok(Json(ProfileResponse::for_viewer(user, viewer.id())))
}

/// A user's tweets, newest first
#[utoipa::path(
    get,
    path = "/users/{username}/tweets",
    tag = "users",
    params(("username" = String, Path, description = "Username"), PageQuery),
    responses(
        (status = 200, description = "One page of the user's tweets", body = PageResponse<TweetResponse>),
        (status = 404, description = "User not found", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(username = %username))]
pub async fn list_user_tweets(
    State(state): State<AppState>,
    Path(username): Path<String>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<PageResponse<TweetResponse>>, Error> {
    let page_size = i64::from(state.config.feed.profile_page_size);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = find_by_username(&mut Users::new(&mut pool_conn), &username).await?;

    let rows = Tweets::new(&mut pool_conn)
        .list(&TweetFilter::new(query.skip(page_size), page_size + 1).by_author(user.id))
        .await?;

    let rows: Vec<TweetResponse> = rows.into_iter().map(TweetResponse::from).collect();
    Ok(Json(PageResponse::from_lookahead(rows, query.page(), page_size)))
}

/// Edit your own profile, and optionally change your password
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = ProfileUpdateResponse),
        (status = 400, description = "Invalid fields, nothing to change, or username/email taken", body = crate::errors::ErrorBody),
        (status = 401, description = "Not logged in", body = crate::errors::ErrorBody),
        (status = 403, description = "Not your profile", body = crate::errors::ErrorBody),
        (status = 404, description = "User not found", body = crate::errors::ErrorBody),
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    AppJson(request): AppJson<ProfileUpdate>,
) -> Result<Json<ProfileUpdateResponse>, Error> {
    if parse_path_id(&id) != Some(current_user.id) {
        return Err(Error::Forbidden {
            message: "You can only edit your own profile".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    let user = user_repo
        .get_by_id(current_user.id)
        .await?
        .ok_or_else(|| user_not_found(&id))?;

    let username = request.username.trim().to_string();
    let bio = request.bio.as_deref().map(|bio| bio.trim().to_string());
    // An empty email keeps the current address
    let email = request
        .email
        .as_deref()
        .map(validation::normalize_email)
        .filter(|email| !email.is_empty());
    let wants_password_change = request.wants_password_change();

    let mut errors = FieldErrors::new();
    validation::check_username(&username, &mut errors);
    if let Some(bio) = &bio
        && bio.chars().count() > validation::BIO_MAX_LENGTH
    {
        errors.add("bio", format!("Bio must be at most {} characters long", validation::BIO_MAX_LENGTH));
    }
    if let Some(email) = &email {
        validation::check_email(email, &mut errors);
    }

    if wants_password_change {
        let current_password = request.current_password.as_deref().unwrap_or_default();
        let new_password = request.new_password.as_deref().unwrap_or_default();
        let confirm_password = request.confirm_password.as_deref().unwrap_or_default();

        if current_password.is_empty() {
            errors.add("current_password", "Current password is required to set a new one");
        }
        validation::check_new_password(new_password, &mut errors);
        if new_password != confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }
    }
    errors.into_result("Invalid profile details")?;

    let username_changed = username != user.username;
    let email_changed = email.as_ref().is_some_and(|email| *email != user.email);
    let bio_changed = bio
        .as_deref()
        .is_some_and(|bio| bio != user.bio.as_deref().unwrap_or_default());

    if !(username_changed || email_changed || bio_changed || wants_password_change) {
        return Err(Error::BadRequest {
            message: "No changes to save".to_string(),
        });
    }

    // Friendly early errors; the UNIQUE constraints settle any race at write time
    let mut errors = FieldErrors::new();
    if username_changed && user_repo.get_user_by_username(&username).await?.is_some() {
        errors.add("username", "This username is already taken");
    }
    if let Some(email) = email.as_deref().filter(|_| email_changed)
        && user_repo.get_user_by_email(email).await?.is_some()
    {
        errors.add("email", "An account with this email address already exists");
    }
    errors.into_result("Invalid profile details")?;

    let password_hash = if wants_password_change {
        let Some(stored_hash) = user.password_hash.clone() else {
            return Err(Error::BadRequest {
                message: "This account has no password to change".to_string(),
            });
        };

        let current_password = request.current_password.unwrap_or_default();
        let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&current_password, &stored_hash))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("spawn password verification task: {e}"),
            })??;

        if !is_valid {
            let mut errors = FieldErrors::new();
            errors.add("current_password", "Current password is incorrect");
            errors.into_result("Invalid profile details")?;
        }

        let new_password = request.new_password.unwrap_or_default();
        let params = password::Argon2Params::from(&state.config.auth.password);
        let hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&new_password, Some(params)))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("spawn password hashing task: {e}"),
            })??;
        Some(hash)
    } else {
        None
    };

    let updated = user_repo
        .update(
            user.id,
            &UserUpdateDBRequest {
                username: username_changed.then_some(username),
                email: email.filter(|_| email_changed),
                bio,
                password_hash,
            },
        )
        .await?;

    Ok(Json(ProfileUpdateResponse {
        message: "Profile updated successfully".to_string(),
        username: updated.username,
    }))
}
