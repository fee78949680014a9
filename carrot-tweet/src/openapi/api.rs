//! OpenAPI documentation for the JSON API.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::{api, errors};

/// Security scheme for the session cookie set by login and registration.
struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "session_cookie".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "delicious-tt",
                    "Encrypted session cookie, set by `/authentication/login` and `/authentication/register`. \
                     The cookie name is configurable with `auth.session.cookie_name`.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Carrot Tweet API",
        description = "Tweets, likes, comments and profiles"
    ),
    modifiers(&SessionCookieAddon),
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::me,
        api::handlers::tweets::list_tweets,
        api::handlers::tweets::create_tweet,
        api::handlers::tweets::get_tweet,
        api::handlers::likes::like_tweet,
        api::handlers::likes::unlike_tweet,
        api::handlers::likes::get_like_status,
        api::handlers::comments::list_comments,
        api::handlers::comments::create_comment,
        api::handlers::comments::delete_comment,
        api::handlers::users::get_profile,
        api::handlers::users::list_user_tweets,
        api::handlers::users::update_profile,
        api::handlers::search::search,
    ),
    components(
        schemas(
            errors::ErrorBody,
            errors::FieldErrors,
            api::models::auth::RegisterRequest,
            api::models::auth::LoginRequest,
            api::models::auth::AuthResponse,
            api::models::auth::AuthSuccessResponse,
            api::models::users::UserResponse,
            api::models::users::AuthorResponse,
            api::models::users::ProfileResponse,
            api::models::users::ProfileUpdate,
            api::models::users::ProfileUpdateResponse,
            api::models::users::UserSummary,
            api::models::tweets::TweetCreate,
            api::models::tweets::TweetResponse,
            api::models::tweets::TweetDetailResponse,
            api::models::pagination::PageResponse<api::models::tweets::TweetResponse>,
            api::models::likes::LikeStatus,
            api::models::comments::CommentCreate,
            api::models::comments::CommentResponse,
            api::models::search::SearchKind,
            api::models::search::SearchResponse,
        )
    ),
    tags(
        (name = "authentication", description = "Registration, login and the session cookie"),
        (name = "tweets", description = "The feed and single tweets"),
        (name = "likes", description = "Liking and unliking tweets"),
        (name = "comments", description = "Comments on tweets"),
        (name = "users", description = "Profiles and profile editing"),
        (name = "search", description = "Substring search over tweets and users"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_documents_every_route() {
        let spec = ApiDoc::openapi();

        for path in [
            "/authentication/register",
            "/authentication/login",
            "/authentication/logout",
            "/authentication/me",
            "/tweets",
            "/tweets/{id}",
            "/tweets/{id}/like",
            "/tweets/{id}/comments",
            "/comments/{id}",
            "/users/{username}",
            "/users/{username}/tweets",
            "/users/{id}",
            "/search",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }

        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("session_cookie"));
        assert!(components.schemas.contains_key("ErrorBody"));
    }
}
