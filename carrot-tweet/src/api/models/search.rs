//! API models for search.

use super::{tweets::TweetResponse, users::UserSummary};
use crate::errors::Error;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// What to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    #[default]
    All,
    Tweets,
    Users,
}

impl SearchKind {
    pub fn includes_tweets(self) -> bool {
        matches!(self, SearchKind::All | SearchKind::Tweets)
    }

    pub fn includes_users(self) -> bool {
        matches!(self, SearchKind::All | SearchKind::Users)
    }
}

impl std::str::FromStr for SearchKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SearchKind::All),
            "tweets" => Ok(SearchKind::Tweets),
            "users" => Ok(SearchKind::Users),
            other => Err(Error::BadRequest {
                message: format!("Unknown search type '{other}', expected one of: all, tweets, users"),
            }),
        }
    }
}

/// Query parameters for search.
///
/// Both are taken as raw strings so bad values get a JSON error body.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct SearchQuery {
    /// Text to look for (case-sensitive)
    pub q: Option<String>,
    /// `all` (default), `tweets` or `users`
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl SearchQuery {
    /// The trimmed search term and kind, or a 400.
    pub fn parse(&self) -> Result<(&str, SearchKind), Error> {
        let term = self.q.as_deref().map(str::trim).unwrap_or_default();
        if term.is_empty() {
            return Err(Error::BadRequest {
                message: "Search query is required".to_string(),
            });
        }

        let kind = match self.kind.as_deref() {
            None | Some("") => SearchKind::All,
            Some(kind) => kind.parse()?,
        };

        Ok((term, kind))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub tweets: Vec<TweetResponse>,
    pub users: Vec<UserSummary>,
}
