use crate::types::TweetId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// State of the like button for one viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LikeStatus {
    pub tweet_id: TweetId,
    pub is_liked: bool,
    pub like_count: i64,
}
