//! Workflow layer — the appointment/consultation state machine.
//!
//! All status transitions for `AppointmentRequest` live in
//! [`appointment`]; creation, editing and deletion of `Consultation`
//! records — including the CONFIRMED-appointment guard — live in
//! [`consultation`]. Both operate on an explicitly passed
//! `rusqlite::Connection`; mutating operations run inside a
//! `BEGIN IMMEDIATE` transaction so guard-then-write sequences on the
//! same request serialize on the database write lock.

pub mod appointment;
pub mod consultation;

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Malformed or missing input — the caller's fault, never retried.
    #[error("{0}")]
    Validation(String),

    /// Operation attempted against an aggregate whose current status does
    /// not permit it, or a uniqueness violation.
    #[error("{0}")]
    StateConflict(String),

    #[error("{entity} not found with id {id}")]
    NotFound { entity: String, id: String },

    /// Opaque storage-layer failure; retry policy belongs to the caller.
    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

impl WorkflowError {
    pub(crate) fn not_found(entity: &str, id: &Uuid) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for WorkflowError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(DatabaseError::Sqlite(e))
    }
}
