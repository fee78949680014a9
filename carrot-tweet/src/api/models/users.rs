//! API request/response models for users and profiles.

use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The user behind a valid session cookie.
///
/// Only the ID travels in the cookie; handlers load anything else they need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub id: UserId,
}

/// A user's own account, as returned after sign-up, login and by `/authentication/me`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            email: db.email,
            bio: db.bio,
            created_at: db.created_at,
        }
    }
}

/// Author of a tweet or comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorResponse {
    pub id: UserId,
    pub username: String,
}

/// A user's public profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: UserId,
    pub username: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub tweet_count: i64,
    /// Whether the viewer is looking at their own profile
    pub is_owner: bool,
    /// Only present for the owner, to prefill the edit form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProfileResponse {
    pub fn for_viewer(db: UserDBResponse, viewer: Option<UserId>) -> Self {
        let is_owner = viewer == Some(db.id);
        Self {
            id: db.id,
            username: db.username,
            bio: db.bio,
            created_at: db.created_at,
            tweet_count: db.tweet_count,
            is_owner,
            email: is_owner.then_some(db.email),
        }
    }
}

/// A user in search results
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub bio: Option<String>,
    pub tweet_count: i64,
    /// Number of tweets this user has liked
    pub like_count: i64,
}

impl From<UserDBResponse> for UserSummary {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            bio: db.bio,
            tweet_count: db.tweet_count,
            like_count: db.like_count,
        }
    }
}

/// Profile edit form.
///
/// `username` is always sent (prefilled). Leaving `email` empty keeps the current address;
/// an empty `bio` clears it. The password fields are all-or-nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProfileUpdate {
    pub username: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

impl ProfileUpdate {
    /// Whether the form asks for a password change at all
    pub fn wants_password_change(&self) -> bool {
        [&self.current_password, &self.new_password, &self.confirm_password]
            .iter()
            .any(|field| field.as_deref().is_some_and(|value| !value.is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdateResponse {
    pub message: String,
    /// The (possibly new) username, for redirecting to the profile page
    pub username: String,
}
