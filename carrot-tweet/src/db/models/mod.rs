//! Database record models matching table schemas.
//!
//! These structs are what repositories accept and return. They are kept apart from the API
//! models in [`crate::api::models`] so that storage and wire representations can evolve
//! independently.
//!
//! - [`users`]: User accounts, credentials and profile fields
//! - [`tweets`]: Tweets, joined with author and engagement counters
//! - [`comments`]: Comments, joined with the author's username
//!
//! Likes have no record model: a like is just the presence of a `(tweet_id, user_id)` row,
//! see [`crate::db::handlers::Likes`].
//!
//! Database models convert into API models with `From`:
//!
//! ```ignore
//! use carrot_tweet::api::models::tweets::TweetResponse;
//!
//! let db_tweet = tweets.get_by_id(42).await?.unwrap();
//! let api_response = TweetResponse::from(db_tweet);
//! ```

pub mod comments;
pub mod tweets;
pub mod users;
