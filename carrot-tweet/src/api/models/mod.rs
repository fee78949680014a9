//! API request and response data models.
//!
//! These structures define the public JSON contract. They are distinct from the database
//! records in [`crate::db::models`] and built from them with `From` or small constructors
//! that need the viewer (see [`users::ProfileResponse::for_viewer`]).
//!
//! # Model Categories
//!
//! - [`auth`]: Sign-up and login payloads, and responses that set the session cookie
//! - [`users`]: Accounts, public profiles and the profile edit form
//! - [`tweets`]: Tweets with their author and counters
//! - [`comments`]: Comments with their author
//! - [`likes`]: Like button state
//! - [`search`]: Search parameters and results
//! - [`pagination`]: `?page=N` and the page envelope
//! - [`validation`]: Field rules shared by the forms

pub mod auth;
pub mod comments;
pub mod likes;
pub mod pagination;
pub mod search;
pub mod tweets;
pub mod users;
pub mod validation;
