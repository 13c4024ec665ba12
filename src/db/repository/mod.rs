//! Repository layer — entity-scoped database operations.
//!
//! Functions take an explicit `&Connection` so callers control
//! transaction boundaries (a `Transaction` derefs to `Connection`).

mod appointment;
mod consultation;

use uuid::Uuid;

use super::DatabaseError;

pub use appointment::*;
pub use consultation::*;

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
