use std::convert::Infallible;

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

/// The session user when a valid session cookie is present, `None` for anonymous visitors.
///
/// Pages that anyone may view take this instead of [`CurrentUser`].
#[derive(Debug, Clone)]
pub struct MaybeCurrentUser(pub Option<CurrentUser>);

impl MaybeCurrentUser {
    pub fn id(&self) -> Option<crate::types::UserId> {
        self.0.as_ref().map(|user| user.id)
    }
}

/// Extract user from the session cookie if present and valid
/// Returns:
/// - None: No session cookie present
/// - Some(Ok(user)): Valid session found and unsealed
/// - Some(Err(error)): Session cookie present but invalid, tampered with or expired
#[instrument(skip(parts, config))]
fn try_session_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.session.cookie_name;

    let mut last_error = None;
    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                match session::verify_session_token(value, config) {
                    Ok(claims) => return Some(Ok(CurrentUser { id: claims.id })),
                    // Keep looking; a stale cookie may sit next to a fresh one
                    Err(e) => last_error = Some(e),
                }
            }
        }
    }

    last_error.map(Err)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_session_auth(parts, &state.config) {
            Some(Ok(user)) => {
                trace!("Found session for user {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("Session authentication failed: {:?}", e);
                Err(Error::Unauthenticated { message: None })
            }
            None => {
                trace!("No session cookie in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

impl FromRequestParts<AppState> for MaybeCurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Infallible> {
        Ok(MaybeCurrentUser(CurrentUser::from_request_parts(parts, state).await.ok()))
    }
}
