//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed [`sqlx::SqliteConnection`] (a pooled connection or a
//! transaction) and returns records from [`crate::db::models`].
//!
//! # Available Repositories
//!
//! - [`Users`]: Accounts, credential lookup and profile updates
//! - [`Tweets`]: Posting and the newest-first feed
//! - [`Comments`]: Comments on a tweet, and their deletion
//! - [`Likes`]: The like toggle and counters
//!
//! # Common Pattern
//!
//! ```ignore
//! use carrot_tweet::db::handlers::{Repository, Tweets, tweets::TweetFilter};
//!
//! async fn example(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
//!     let mut conn = pool.acquire().await?;
//!     let mut repo = Tweets::new(&mut conn);
//!     let newest = repo.list(&TweetFilter::new(0, 10)).await?;
//!     Ok(())
//! }
//! ```
//!
//! [`Users`], [`Tweets`] and [`Comments`] implement [`Repository`] (`create`, `get_by_id`,
//! `list`). [`Likes`] has its own small API since a like has no identity of its own.

pub mod comments;
pub mod likes;
pub mod repository;
pub mod tweets;
pub mod users;

pub use comments::Comments;
pub use likes::Likes;
pub use repository::Repository;
pub use tweets::Tweets;
pub use users::Users;
