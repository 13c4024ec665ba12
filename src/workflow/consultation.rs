//! Consultation records, gated on appointment state.
//!
//! Creation is the only guarded operation: the linked request must be
//! CONFIRMED, the consultation date must fall on the confirmed calendar
//! day, and the request flips to CONSULTED in the same transaction as the
//! insert. Either both writes land or neither does.

use chrono::{Local, NaiveDateTime};
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use super::{appointment, WorkflowError};
use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::enums::RequestStatus;
use crate::models::{Consultation, ConsultationUpdate, NewConsultation};

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn validate_clinical_content(diagnosis: &str) -> Result<(), WorkflowError> {
    if diagnosis.trim().is_empty() {
        return Err(WorkflowError::Validation("diagnosis is required".into()));
    }
    Ok(())
}

/// Creates the consultation for a CONFIRMED appointment request and flips
/// the request to CONSULTED atomically.
///
/// Client and provider references are derived from the appointment row,
/// never from the caller. The consultation date must fall on the same
/// calendar day as the confirmed date-time (exact-instant equality would
/// be brittle against clock precision).
pub fn create_consultation(
    conn: &mut Connection,
    new: &NewConsultation,
) -> Result<Consultation, WorkflowError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let req = repository::get_appointment_request(&tx, &new.appointment_request_id)?
        .ok_or_else(|| WorkflowError::not_found("appointment request", &new.appointment_request_id))?;

    match req.status {
        RequestStatus::Consulted => {
            return Err(WorkflowError::StateConflict(format!(
                "a consultation already exists for appointment request {}",
                req.id
            )));
        }
        RequestStatus::Confirmed => {}
        other => {
            return Err(WorkflowError::StateConflict(format!(
                "a consultation requires a CONFIRMED appointment; current status: {}",
                other.as_str()
            )));
        }
    }

    validate_clinical_content(&new.diagnosis)?;

    let confirmed_at = req.confirmed_at.ok_or_else(|| {
        WorkflowError::Storage(DatabaseError::ConstraintViolation(format!(
            "CONFIRMED appointment request {} has no confirmed date",
            req.id
        )))
    })?;
    if new.consulted_at.date() != confirmed_at.date() {
        return Err(WorkflowError::Validation(format!(
            "consultation date {} must fall on the confirmed appointment day {}",
            new.consulted_at.date(),
            confirmed_at.date()
        )));
    }

    let created_at = now();
    let id = repository::insert_consultation(&tx, new, req.client_id, req.provider_id, created_at)
        .map_err(|e| match e {
            DatabaseError::ConstraintViolation(msg) => WorkflowError::StateConflict(msg),
            other => WorkflowError::Storage(other),
        })?;
    appointment::mark_consulted(&tx, &req.id)?;
    tx.commit()?;

    tracing::info!(
        consultation = %id,
        request = %req.id,
        client = req.client_id,
        provider = req.provider_id,
        "consultation created, appointment request marked CONSULTED"
    );

    Ok(Consultation {
        id,
        appointment_request_id: req.id,
        client_id: req.client_id,
        provider_id: req.provider_id,
        notes: new.notes.clone(),
        diagnosis: new.diagnosis.clone(),
        prescription: new.prescription.clone(),
        consulted_at: new.consulted_at,
        created_at,
    })
}

/// Edits the clinical content of an existing consultation in place.
/// The appointment-status guard is not re-run: editing a record is not
/// gated by where its appointment ended up.
pub fn update_consultation(
    conn: &mut Connection,
    patch: &ConsultationUpdate,
) -> Result<Consultation, WorkflowError> {
    validate_clinical_content(&patch.diagnosis)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let existing = repository::get_consultation(&tx, &patch.id)?
        .ok_or_else(|| WorkflowError::not_found("consultation", &patch.id))?;

    repository::update_consultation(&tx, patch)?;
    tx.commit()?;

    tracing::info!(consultation = %patch.id, "consultation updated");

    Ok(Consultation {
        notes: patch.notes.clone(),
        diagnosis: patch.diagnosis.clone(),
        prescription: patch.prescription.clone(),
        consulted_at: patch.consulted_at,
        ..existing
    })
}

/// Deletes a consultation. The owning appointment request keeps its
/// CONSULTED status: history can be purged without reopening the request.
pub fn delete_consultation(conn: &mut Connection, id: &Uuid) -> Result<(), WorkflowError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let deleted = repository::delete_consultation(&tx, id)?;
    if deleted == 0 {
        return Err(WorkflowError::not_found("consultation", id));
    }
    tx.commit()?;

    tracing::info!(consultation = %id, "consultation deleted");
    Ok(())
}

pub fn get_consultation(conn: &Connection, id: &Uuid) -> Result<Consultation, WorkflowError> {
    repository::get_consultation(conn, id)?
        .ok_or_else(|| WorkflowError::not_found("consultation", id))
}

pub fn list_consultations(conn: &Connection) -> Result<Vec<Consultation>, WorkflowError> {
    Ok(repository::list_consultations(conn)?)
}

pub fn get_consultations_by_client(
    conn: &Connection,
    client_id: i64,
) -> Result<Vec<Consultation>, WorkflowError> {
    Ok(repository::get_consultations_by_client(conn, client_id)?)
}

pub fn get_consultations_by_provider(
    conn: &Connection,
    provider_id: i64,
) -> Result<Vec<Consultation>, WorkflowError> {
    Ok(repository::get_consultations_by_provider(conn, provider_id)?)
}

pub fn get_consultations_by_request(
    conn: &Connection,
    request_id: &Uuid,
) -> Result<Vec<Consultation>, WorkflowError> {
    Ok(repository::get_consultations_by_request(conn, request_id)?)
}
