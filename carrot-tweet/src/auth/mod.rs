//! Authentication.
//!
//! Users sign up and log in with email and password. A successful login sets an encrypted,
//! HTTP-only session cookie; there is no server-side session store.
//!
//! # Session cookie
//!
//! The cookie (named `delicious-tt` by default) holds `{"id", "iat", "exp"}` sealed with
//! AES-256-GCM under a key derived from `secret_key`. A cookie that fails to unseal or has
//! expired is treated exactly like a missing one.
//!
//! # Modules
//!
//! - [`current_user`]: Extractors for getting the session user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: Sealing, unsealing and the `Set-Cookie` values
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use carrot_tweet::api::models::users::CurrentUser;
//! use carrot_tweet::auth::current_user::MaybeCurrentUser;
//!
//! // Requires a session, otherwise 401
//! async fn post_something(current_user: CurrentUser) -> String {
//!     format!("Hello, user {}!", current_user.id)
//! }
//!
//! // Anyone may call this
//! async fn view_something(viewer: MaybeCurrentUser) -> String {
//!     match viewer.id() {
//!         Some(id) => format!("Welcome back, {id}"),
//!         None => "Welcome, stranger".to_string(),
//!     }
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod session;
