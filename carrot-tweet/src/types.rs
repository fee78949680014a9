//! Common type definitions.
//!
//! All entity IDs are SQLite `INTEGER PRIMARY KEY` values wrapped in type aliases:
//!
//! - [`UserId`]: User account identifier
//! - [`TweetId`]: Tweet identifier
//! - [`CommentId`]: Comment identifier

// Type aliases for IDs
pub type UserId = i64;
pub type TweetId = i64;
pub type CommentId = i64;

/// Parse an ID taken from a URL path segment.
///
/// Returns `None` for anything that is not a positive integer, so that handlers can answer
/// with a 404 rather than a deserialization error (`/tweets/abc` is simply a tweet that does
/// not exist).
pub fn parse_path_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}
