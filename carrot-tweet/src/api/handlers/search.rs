use axum::{
    Json,
    extract::State,
};

use crate::{
    AppState,
    api::extract::AppQuery,
    api::models::{
        search::{SearchQuery, SearchResponse},
        tweets::TweetResponse,
        users::UserSummary,
    },
    db::handlers::{Repository, Tweets, Users, tweets::TweetFilter, users::UserFilter},
    errors::Error,
};

/// Search tweets and users by substring
#[utoipa::path(
    get,
    path = "/search",
    tag = "search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching tweets and users", body = SearchResponse),
        (status = 400, description = "Missing query or unknown type", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn search(State(state): State<AppState>, AppQuery(query): AppQuery<SearchQuery>) -> Result<Json<SearchResponse>, Error> {
    let (term, kind) = query.parse()?;
    let limit = i64::from(state.config.feed.search_limit);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut response = SearchResponse::default();

    if kind.includes_tweets() {
        let tweets = Tweets::new(&mut pool_conn)
            .list(&TweetFilter::new(0, limit).containing(term))
            .await?;
        response.tweets = tweets.into_iter().map(TweetResponse::from).collect();
    }

    if kind.includes_users() {
        let users = Users::new(&mut pool_conn)
            .list(&UserFilter::new(0, limit).matching(term))
            .await?;
        response.users = users.into_iter().map(UserSummary::from).collect();
    }

    tracing::debug!(
        tweets = response.tweets.len(),
        users = response.users.len(),
        "Search for {:?} ({:?})",
        term,
        kind
    );

    Ok(Json(response))
}
