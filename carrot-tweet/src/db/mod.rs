//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with SQLite.
//! It follows the Repository pattern to provide clean abstractions over database operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   SQLite    │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! # Constraints
//!
//! Username and email uniqueness, one like per `(tweet, user)` and the foreign keys from
//! comments and likes to their tweet are all enforced by the schema. Handlers may check
//! first to give a friendlier error, but the constraint is what decides; see
//! [`errors::DbError::UniqueViolation`].
//!
//! # Migrations
//!
//! Migrations live in the `migrations/` directory and are embedded at compile time.
//! They run on startup through [`crate::migrator`]:
//!
//! ```ignore
//! carrot_tweet::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
