//! Request body and query string extractors whose rejections are [`Error`]s.
//!
//! axum's own [`axum::Json`] and [`axum::extract::Query`] answer a malformed request with a
//! plain-text 400, 415 or 422. These wrappers run the same extraction and turn the rejection
//! into [`Error::BadRequest`], so clients always get the JSON error body.
//!
//! Responses still use [`axum::Json`].

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

use crate::errors::Error;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct AppQuery<T>(pub T);
