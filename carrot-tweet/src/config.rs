//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `CARROT_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `CARROT_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `CARROT_FEED__PAGE_SIZE=20` sets the `feed.page_size` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use carrot_tweet::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}", config.bind_address());
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding
//! - **Database**: `database.url`, `database.max_connections` - SQLite connection settings
//! - **Security**: `secret_key` - Key material for the encrypted session cookie
//! - **Authentication**: `auth.password`, `auth.session`, `auth.cors` - Sign-up rules, cookie and CORS settings
//! - **Feed**: `feed.page_size`, `feed.search_limit`, ... - Window sizes for lists
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! CARROT_PORT=8080
//!
//! # Set database connection
//! DATABASE_URL="sqlite:///var/lib/carrot/carrot.db"
//!
//! # Override nested values
//! CARROT_AUTH__ALLOW_REGISTRATION=false
//! CARROT_AUTH__SESSION__TIMEOUT=7d
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::Error;

/// The session key is derived from the secret, so short secrets are refused.
pub const MIN_SECRET_KEY_LENGTH: usize = 32;

/// Upper bound for `auth.session.timeout` (five years).
pub const MAX_SESSION_TIMEOUT: Duration = Duration::from_secs(5 * 365 * 24 * 60 * 60);

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "CARROT_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Set from the `DATABASE_URL` environment variable; folded into `database.url` on load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// SQLite database settings
    pub database: DatabaseConfig,
    /// Secret the session cookie key is derived from (required, at least 32 characters)
    pub secret_key: Option<String>,
    /// Sign-up, login and session cookie configuration
    pub auth: AuthConfig,
    /// Window sizes for the feed, profiles and search
    pub feed: FeedConfig,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// SQLite database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `sqlite://carrot.db` or `sqlite::memory:`
    pub url: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Create the database file if it does not exist yet
    pub create_if_missing: bool,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Allow new users to self-register
    pub allow_registration: bool,
    /// Password validation rules
    pub password: PasswordConfig,
    /// Session cookie configuration
    pub session: SessionConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// How long a session cookie stays valid
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Cookie name for the sealed session
    pub cookie_name: String,
    /// Set Secure flag on cookies (HTTPS only)
    pub cookie_secure: bool,
    /// SameSite cookie attribute ("strict", "lax", or "none")
    pub cookie_same_site: String,
}

/// Password validation rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length at sign-up
    pub min_length: usize,
    /// Maximum password length at sign-up
    pub max_length: usize,
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB, secure for production)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2, secure for production)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

/// Window sizes for paginated and capped lists.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Tweets per page of the home feed
    pub page_size: u32,
    /// Tweets per page on a user's profile
    pub profile_page_size: u32,
    /// Maximum tweets and users returned by a search
    pub search_limit: u32,
    /// Maximum tweet length in characters
    pub max_tweet_length: usize,
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://carrot.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: None,
            database: DatabaseConfig::default(),
            secret_key: None,
            auth: AuthConfig::default(),
            feed: FeedConfig::default(),
            enable_otel_export: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://carrot.db".to_string(),
            max_connections: 10,
            create_if_missing: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allow_registration: true,
            password: PasswordConfig::default(),
            session: SessionConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(14 * 24 * 60 * 60), // 14 days
            cookie_name: "delicious-tt".to_string(),
            cookie_secure: true,
            cookie_same_site: "lax".to_string(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 64,
            // Secure defaults for production (Argon2id RFC recommendations)
            argon2_memory_kib: 19456, // 19 MB
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Url(Url::parse("http://localhost:3000").expect("static URL is valid"))],
            allow_credentials: true,
            max_age: Some(3600), // Cache preflight for 1 hour
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            profile_page_size: 5,
            search_limit: 20,
            max_tweet_length: 280,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        match &self.secret_key {
            None => {
                return Err(Error::Internal {
                    operation: "Config validation: secret_key is not configured. \
                     Please set CARROT_SECRET_KEY environment variable or add secret_key to config file."
                        .to_string(),
                });
            }
            Some(key) if key.chars().count() < MIN_SECRET_KEY_LENGTH => {
                return Err(Error::Internal {
                    operation: format!("Config validation: secret_key must be at least {MIN_SECRET_KEY_LENGTH} characters long"),
                });
            }
            Some(_) => {}
        }

        let password = &self.auth.password;
        if password.min_length > password.max_length {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: Invalid password configuration: min_length ({}) cannot be greater than max_length ({})",
                    password.min_length, password.max_length
                ),
            });
        }

        if password.min_length < 1 {
            return Err(Error::Internal {
                operation: "Config validation: Invalid password configuration: min_length must be at least 1".to_string(),
            });
        }

        // Less than 5 minutes
        if self.auth.session.timeout.as_secs() < 300 {
            return Err(Error::Internal {
                operation: "Config validation: session timeout is too short (minimum 5 minutes)".to_string(),
            });
        }

        if self.auth.session.timeout > MAX_SESSION_TIMEOUT {
            return Err(Error::Internal {
                operation: "Config validation: session timeout is too long (maximum 5 years)".to_string(),
            });
        }

        if self.feed.page_size == 0 || self.feed.profile_page_size == 0 || self.feed.search_limit == 0 {
            return Err(Error::Internal {
                operation: "Config validation: feed page sizes and search_limit must be positive".to_string(),
            });
        }

        if self.feed.max_tweet_length == 0 {
            return Err(Error::Internal {
                operation: "Config validation: feed.max_tweet_length must be positive".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(Error::Internal {
                operation: "Config validation: database.max_connections must be positive".to_string(),
            });
        }

        let cors = &self.auth.cors;
        if cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }

        let has_wildcard = cors.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard));
        if has_wildcard && cors.allow_credentials {
            return Err(Error::Internal {
                operation: "Config validation: CORS cannot use wildcard origin '*' with allow_credentials=true. Specify explicit origins."
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("CARROT_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    const SECRET: &str = "a-test-secret-key-that-is-long-enough";

    fn test_args() -> Args {
        Args {
            config: "test.yaml".to_string(),
            validate: false,
        }
    }

    fn valid_config() -> Config {
        Config {
            secret_key: Some(SECRET.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", &format!("secret_key: {SECRET}\n"))?;

            let config = Config::load(&test_args())?;

            assert_eq!(config.bind_address(), "0.0.0.0:3001");
            assert_eq!(config.database.url, "sqlite://carrot.db");
            assert_eq!(config.auth.session.cookie_name, "delicious-tt");
            assert_eq!(config.auth.session.timeout, Duration::from_secs(14 * 24 * 60 * 60));
            assert_eq!(config.feed.page_size, 10);
            assert_eq!(config.feed.profile_page_size, 5);
            assert_eq!(config.feed.search_limit, 20);
            assert_eq!(config.feed.max_tweet_length, 280);
            assert!(!config.enable_otel_export);

            Ok(())
        });
    }

    #[test]
    fn test_shipped_config_file() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", include_str!("../config.yaml"))?;
            jail.set_env("CARROT_SECRET_KEY", SECRET);

            let config = Config::load(&test_args())?;
            assert_eq!(config.port, 3001);
            assert_eq!(config.auth.cors.allowed_origins.len(), 1);

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                &format!(
                    r#"
secret_key: {SECRET}
feed:
  page_size: 25
  search_limit: 50
"#
                ),
            )?;

            jail.set_env("CARROT_HOST", "127.0.0.1");
            jail.set_env("CARROT_PORT", "8080");
            jail.set_env("CARROT_FEED__PAGE_SIZE", "15");

            let config = Config::load(&test_args())?;

            // Env vars should override
            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 8080);
            assert_eq!(config.feed.page_size, 15);

            // YAML values should be preserved
            assert_eq!(config.feed.search_limit, 50);

            Ok(())
        });
    }

    #[test]
    fn test_database_url_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                &format!(
                    r#"
secret_key: {SECRET}
database:
  url: sqlite://from-yaml.db
  max_connections: 3
"#
                ),
            )?;

            jail.set_env("DATABASE_URL", "sqlite://from-env.db");

            let config = Config::load(&test_args())?;

            assert_eq!(config.database.url, "sqlite://from-env.db");
            assert_eq!(config.database.max_connections, 3);
            assert!(config.database_url.is_none());

            Ok(())
        });
    }

    #[test]
    fn test_auth_config_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                &format!(
                    r#"
secret_key: {SECRET}
auth:
  allow_registration: false
  password:
    min_length: 12
  session:
    timeout: "2h"
    cookie_secure: false
  cors:
    allowed_origins:
      - "https://carrot.example.com"
"#
                ),
            )?;

            let config = Config::load(&test_args())?;

            assert!(!config.auth.allow_registration);
            assert_eq!(config.auth.password.min_length, 12);
            assert_eq!(config.auth.password.max_length, 64); // still default
            assert_eq!(config.auth.session.timeout, Duration::from_secs(2 * 60 * 60));
            assert!(!config.auth.session.cookie_secure);
            assert_eq!(config.auth.session.cookie_name, "delicious-tt");
            assert!(matches!(
                &config.auth.cors.allowed_origins[..],
                [CorsOrigin::Url(url)] if url.as_str() == "https://carrot.example.com/"
            ));

            Ok(())
        });
    }

    #[test]
    fn test_unknown_field_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                &format!(
                    r#"
secret_key: {SECRET}
feed:
  pagesize: 10
"#
                ),
            )?;

            assert!(Config::load(&test_args()).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_config_validation_missing_secret() {
        let config = Config::default();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("secret_key is not configured"));
    }

    #[test]
    fn test_config_validation_short_secret() {
        let config = Config {
            secret_key: Some("too-short".to_string()),
            ..Default::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("at least 32 characters"));
    }

    #[test]
    fn test_config_validation_invalid_password_length() {
        let mut config = valid_config();
        config.auth.password.min_length = 10;
        config.auth.password.max_length = 5;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("min_length"));
    }

    #[test]
    fn test_config_validation_session_timeout_bounds() {
        let mut config = valid_config();
        config.auth.session.timeout = Duration::from_secs(60);
        assert!(config.validate().unwrap_err().to_string().contains("too short"));

        config.auth.session.timeout = MAX_SESSION_TIMEOUT;
        assert!(config.validate().is_ok());

        config.auth.session.timeout = MAX_SESSION_TIMEOUT + Duration::from_secs(1);
        assert!(config.validate().unwrap_err().to_string().contains("too long"));
    }

    #[test]
    fn test_huge_session_timeout_rejected_on_load() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                &format!(
                    r#"
secret_key: {SECRET}
auth:
  session:
    timeout: "1000000y"
"#
                ),
            )?;

            let err = Config::load(&test_args()).unwrap_err();
            assert!(err.to_string().contains("too long"));
            Ok(())
        });
    }

    #[test]
    fn test_config_validation_zero_page_size() {
        let mut config = valid_config();
        config.feed.profile_page_size = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("page sizes"));
    }

    #[test]
    fn test_config_validation_wildcard_with_credentials() {
        let mut config = valid_config();
        config.auth.cors.allowed_origins = vec![CorsOrigin::Wildcard];
        config.auth.cors.allow_credentials = true;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("wildcard"));

        config.auth.cors.allow_credentials = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_valid_config() {
        assert!(valid_config().validate().is_ok());
    }
}
