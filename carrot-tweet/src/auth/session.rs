//! Encrypted session cookies.
//!
//! The cookie value is the JSON [`SessionClaims`] sealed with a key derived from
//! `secret_key` (see [`crate::crypto`]). Nothing about the session is stored server-side.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{config::Config, crypto::SealingKey, errors::Error, types::UserId};

/// Session payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: UserId, // User ID
    pub iat: i64,   // Issued at
    pub exp: i64,   // Expiration time
}

impl SessionClaims {
    /// Create new session claims for a user
    pub fn new(user_id: UserId, config: &Config) -> Self {
        let now = Utc::now();
        // Saturate rather than overflow on timeouts `Config::validate` was never run on
        let timeout = TimeDelta::from_std(config.auth.session.timeout).unwrap_or(TimeDelta::MAX);
        let expires = now.checked_add_signed(timeout).unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            id: user_id,
            iat: now.timestamp(),
            exp: expires.timestamp(),
        }
    }
}

fn sealing_key(config: &Config) -> Result<SealingKey, Error> {
    let secret_key = config.secret_key.as_ref().ok_or_else(|| Error::Internal {
        operation: "sessions: secret_key is required".to_string(),
    })?;

    Ok(SealingKey::derive(secret_key))
}

/// Seal a session for a user
pub fn create_session_token(user_id: UserId, config: &Config) -> Result<String, Error> {
    seal_claims(&SessionClaims::new(user_id, config), config)
}

fn seal_claims(claims: &SessionClaims, config: &Config) -> Result<String, Error> {
    let payload = serde_json::to_vec(claims).map_err(|e| Error::Internal {
        operation: format!("serialize session: {e}"),
    })?;

    sealing_key(config)?.seal(&payload).map_err(|e| Error::Internal {
        operation: format!("seal session: {e}"),
    })
}

/// Unseal and check a session token.
///
/// Anything that does not decrypt, does not parse, or has expired is
/// [`Error::Unauthenticated`].
pub fn verify_session_token(token: &str, config: &Config) -> Result<SessionClaims, Error> {
    let payload = sealing_key(config)?
        .open(token)
        .map_err(|_| Error::Unauthenticated { message: None })?;

    let claims: SessionClaims = serde_json::from_slice(&payload).map_err(|_| Error::Unauthenticated { message: None })?;

    if claims.exp <= Utc::now().timestamp() {
        return Err(Error::Unauthenticated {
            message: Some("Session expired".to_string()),
        });
    }

    Ok(claims)
}

/// `Set-Cookie` value carrying a sealed session
pub fn create_session_cookie(token: &str, config: &Config) -> String {
    let session = &config.auth.session;
    let secure = if session.cookie_secure { "; Secure" } else { "" };

    format!(
        "{}={}; Path=/; HttpOnly{}; SameSite={}; Max-Age={}",
        session.cookie_name,
        token,
        secure,
        session.cookie_same_site,
        session.timeout.as_secs()
    )
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(config: &Config) -> String {
    let session = &config.auth.session;
    let secure = if session.cookie_secure { "; Secure" } else { "" };

    format!(
        "{}=; Path=/; HttpOnly{}; SameSite={}; Max-Age=0",
        session.cookie_name, secure, session.cookie_same_site
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn create_test_config() -> Config {
        let mut config = Config {
            secret_key: Some("test-secret-key-for-sessions-0123456789".to_string()),
            ..Default::default()
        };
        config.auth.session.timeout = Duration::from_secs(3600);
        config
    }

    #[test]
    fn test_create_and_verify_session_token() {
        let config = create_test_config();

        let token = create_session_token(42, &config).unwrap();
        assert!(!token.is_empty());

        let claims = verify_session_token(&token, &config).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let mut config = create_test_config();
        config.auth.session.timeout = Duration::from_secs(u64::MAX);

        let claims = SessionClaims::new(1, &config);
        assert_eq!(claims.exp, DateTime::<Utc>::MAX_UTC.timestamp());
    }

    #[test]
    fn test_verify_invalid_token() {
        let config = create_test_config();

        let result = verify_session_token("invalid.token.here", &config);
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let mut config = create_test_config();
        let token = create_session_token(42, &config).unwrap();

        config.secret_key = Some("a-different-secret-key-of-enough-length".to_string());
        let result = verify_session_token(&token, &config);
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    }

    #[test]
    fn test_verify_expired_token() {
        let config = create_test_config();
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            id: 42,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = seal_claims(&claims, &config).unwrap();

        let result = verify_session_token(&token, &config);
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    }

    #[test]
    fn test_missing_secret_is_internal() {
        let config = Config::default();
        assert!(matches!(create_session_token(1, &config), Err(Error::Internal { .. })));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let mut config = create_test_config();

        let cookie = create_session_cookie("abc", &config);
        assert_eq!(cookie, "delicious-tt=abc; Path=/; HttpOnly; Secure; SameSite=lax; Max-Age=3600");

        config.auth.session.cookie_secure = false;
        let cleared = clear_session_cookie(&config);
        assert_eq!(cleared, "delicious-tt=; Path=/; HttpOnly; SameSite=lax; Max-Age=0");
    }
}
