//! # carrot-tweet: a small social feed service
//!
//! `carrot-tweet` is the JSON backend of a Twitter-like site. Users register with a username,
//! email and password, post short tweets, like them, comment on them, edit their profile and
//! search for tweets and people. A browser front end talks to it over JSON, authenticated by an
//! encrypted session cookie.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! keeps everything in a single SQLite database, accessed through a [`sqlx`] connection pool
//! that lives in [`AppState`]. Requests are short-lived and stateless; there are no background
//! tasks.
//!
//! ### Request Flow
//!
//! A request first passes the CORS and tracing layers. Handlers that need a user take a
//! [`api::models::users::CurrentUser`] extractor, which opens the session cookie and answers 401
//! if it is missing, tampered with or expired; handlers that merely adapt to the viewer take a
//! [`auth::current_user::MaybeCurrentUser`] instead. The handler validates its input, talks to
//! the database through the repositories in [`db::handlers`], and returns JSON. Every failure is
//! an [`errors::Error`], rendered as a JSON body with a `message` and, for form validation,
//! per-field `field_errors`.
//!
//! ### Core Components
//!
//! - **API layer** ([`api`]): handlers and request/response models for authentication, the
//!   feed, likes, comments, profiles and search.
//! - **Authentication** ([`auth`]): Argon2 password hashing and the AES-GCM sealed session
//!   cookie.
//! - **Database layer** ([`db`]): one repository per table behind the [`db::handlers::Repository`]
//!   trait. Uniqueness of usernames, emails and likes is enforced by the schema.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use carrot_tweet::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = carrot_tweet::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     carrot_tweet::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! Migrations run automatically on startup. To run them by hand:
//!
//! ```no_run
//! # use sqlx::SqlitePool;
//! # async fn example(pool: SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
//! carrot_tweet::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod auth;
pub mod config;
mod crypto;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(test)]
mod test;
#[cfg(test)]
mod test_utils;

use crate::{config::CorsOrigin, openapi::ApiDoc};
use axum::{
    Json, Router,
    http::{self, HeaderValue, Method},
    routing::{delete, get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{CommentId, TweetId, UserId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the carrot-tweet database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the SQLite pool with foreign keys enforced, and bring the schema up to date.
#[instrument(skip_all)]
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(config.database.create_if_missing)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(options)
        .await?;

    migrator().run(&pool).await?;
    info!("Database ready at {}", config.database.url);

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.cors;

    let allow_origin = if cors_config
        .allowed_origins
        .iter()
        .any(|origin| matches!(origin, CorsOrigin::Wildcard))
    {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Browsers send the bare origin, without the trailing slash a parsed URL carries
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - Authentication routes (`/authentication/*`)
/// - The feed, likes, comments, profiles and search
/// - OpenAPI spec at `/openapi.json` and interactive docs at `/docs`
/// - CORS configuration
/// - Tracing middleware
///
/// # Errors
///
/// Returns an error if the CORS configuration can't be turned into headers.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/authentication/register", post(api::handlers::auth::register))
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .route("/authentication/me", get(api::handlers::auth::me));

    let api_routes = Router::new()
        // Feed
        .route(
            "/tweets",
            get(api::handlers::tweets::list_tweets).post(api::handlers::tweets::create_tweet),
        )
        .route("/tweets/{id}", get(api::handlers::tweets::get_tweet))
        // Likes
        .route(
            "/tweets/{id}/like",
            get(api::handlers::likes::get_like_status)
                .post(api::handlers::likes::like_tweet)
                .delete(api::handlers::likes::unlike_tweet),
        )
        // Comments
        .route(
            "/tweets/{id}/comments",
            get(api::handlers::comments::list_comments).post(api::handlers::comments::create_comment),
        )
        .route("/comments/{id}", delete(api::handlers::comments::delete_comment))
        // Profiles: GET takes a username, PATCH a user ID, so both share one segment name
        .route(
            "/users/{user}",
            get(api::handlers::users::get_profile).patch(api::handlers::users::update_profile),
        )
        .route("/users/{user}/tweets", get(api::handlers::users::list_user_tweets))
        .route("/search", get(api::handlers::search::search));

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .merge(api_routes)
        .with_state(state.clone())
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let router = router.layer(create_cors_layer(&state.config)?).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assembled service.
///
/// 1. **Create**: [`Application::new`] opens the database and runs migrations
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal is received, in-flight requests finish and the
///    pool is closed
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Like [`Application::new`], but reuse an existing pool (migrations are still applied).
    pub async fn new_with_pool(config: Config, pool: Option<SqlitePool>) -> anyhow::Result<Self> {
        debug!("Starting carrot-tweet with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => {
                migrator().run(&pool).await?;
                pool
            }
            None => setup_database(&config).await?,
        };

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "carrot-tweet listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
