//! OpenAPI/Swagger documentation configuration.
//!
//! [`ApiDoc`] covers every JSON route; it is served at `/openapi.json` and rendered at `/docs`.

mod api;

pub use api::ApiDoc;
