//! HTTP transport boundary.
//!
//! Routes are nested under `/api/` and map workflow outcomes onto the
//! status-code contract: created → 201, validation → 400, not-found →
//! 404, state conflict → 409, storage failure → 500. The router is
//! composable — `api_router()` returns a `Router` that can be mounted on
//! any axum server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;

pub use router::api_router;
pub use types::ApiContext;
