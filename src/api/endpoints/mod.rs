//! API endpoint handlers, one module per aggregate.
//!
//! Handlers are thin: decode the request, call the workflow, map errors
//! through `ApiError`.

pub mod appointments;
pub mod consultations;
pub mod health;
