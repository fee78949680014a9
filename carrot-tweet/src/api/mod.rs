//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): Register, login, logout, current account
//! - **Tweets** (`/tweets`, `/tweets/{id}`): The feed and single tweets
//! - **Likes** (`/tweets/{id}/like`)
//! - **Comments** (`/tweets/{id}/comments`, `/comments/{id}`)
//! - **Users** (`/users/{username}`, `/users/{username}/tweets`, `PATCH /users/{id}`)
//! - **Search** (`/search`)
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa` annotations. The spec is served at
//! `/openapi.json` and rendered at `/docs`.

pub mod extract;
pub mod handlers;
pub mod models;
