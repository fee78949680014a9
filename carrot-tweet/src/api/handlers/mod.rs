//! HTTP request handlers for all API endpoints.
//!
//! Axum route handlers organized by resource type. Each handler validates its input, checks
//! who is asking, calls the database repositories and serializes the response.
//!
//! # Handler Modules
//!
//! - [`auth`]: Registration, login, logout and the current account
//! - [`tweets`]: The paginated feed, posting, and single tweets
//! - [`likes`]: Liking, unliking and like status
//! - [`comments`]: Listing, posting and deleting comments
//! - [`users`]: Profiles, a user's tweets and profile editing
//! - [`search`]: Substring search over tweets and users
//!
//! # Authentication
//!
//! Handlers that need a logged-in user take a
//! [`CurrentUser`](crate::api::models::users::CurrentUser) argument; those that only adapt to
//! the viewer take [`MaybeCurrentUser`](crate::auth::current_user::MaybeCurrentUser).
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`], which converts to the matching HTTP status and a
//! JSON error body.

pub mod auth;
pub mod comments;
pub mod likes;
pub mod search;
pub mod tweets;
pub mod users;
