use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse_uuid;
use crate::db::DatabaseError;
use crate::models::{Consultation, ConsultationUpdate, NewConsultation};

const CONSULTATION_COLUMNS: &str =
    "id, appointment_request_id, client_id, provider_id, notes, diagnosis, prescription,
     consulted_at, created_at";

/// A unique index holds the one-consultation-per-request rule at the
/// storage level; a second insert surfaces as `ConstraintViolation`.
pub fn insert_consultation(
    conn: &Connection,
    new: &NewConsultation,
    client_id: i64,
    provider_id: i64,
    created_at: NaiveDateTime,
) -> Result<Uuid, DatabaseError> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO consultations (id, appointment_request_id, client_id, provider_id,
         notes, diagnosis, prescription, consulted_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id.to_string(),
            new.appointment_request_id.to_string(),
            client_id,
            provider_id,
            new.notes,
            new.diagnosis,
            new.prescription,
            new.consulted_at,
            created_at,
        ],
    )
    .map_err(|e| match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation(format!(
                "consultation already exists for appointment request {}",
                new.appointment_request_id
            ))
        }
        _ => DatabaseError::Sqlite(e),
    })?;
    Ok(id)
}

pub fn get_consultation(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Consultation>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONSULTATION_COLUMNS} FROM consultations WHERE id = ?1"
    ))?;

    let mut rows = stmt.query_map(params![id.to_string()], consultation_row)?;
    match rows.next() {
        Some(row) => Ok(Some(consultation_from_row(row?)?)),
        None => Ok(None),
    }
}

pub fn list_consultations(conn: &Connection) -> Result<Vec<Consultation>, DatabaseError> {
    query_consultations(conn, &format!(
        "SELECT {CONSULTATION_COLUMNS} FROM consultations ORDER BY consulted_at DESC"
    ), params![])
}

pub fn get_consultations_by_client(
    conn: &Connection,
    client_id: i64,
) -> Result<Vec<Consultation>, DatabaseError> {
    query_consultations(conn, &format!(
        "SELECT {CONSULTATION_COLUMNS} FROM consultations
         WHERE client_id = ?1 ORDER BY consulted_at DESC"
    ), params![client_id])
}

pub fn get_consultations_by_provider(
    conn: &Connection,
    provider_id: i64,
) -> Result<Vec<Consultation>, DatabaseError> {
    query_consultations(conn, &format!(
        "SELECT {CONSULTATION_COLUMNS} FROM consultations
         WHERE provider_id = ?1 ORDER BY consulted_at DESC"
    ), params![provider_id])
}

pub fn get_consultations_by_request(
    conn: &Connection,
    request_id: &Uuid,
) -> Result<Vec<Consultation>, DatabaseError> {
    query_consultations(conn, &format!(
        "SELECT {CONSULTATION_COLUMNS} FROM consultations
         WHERE appointment_request_id = ?1 ORDER BY consulted_at DESC"
    ), params![request_id.to_string()])
}

/// Returns the number of rows changed.
pub fn update_consultation(
    conn: &Connection,
    patch: &ConsultationUpdate,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE consultations SET notes = ?1, diagnosis = ?2, prescription = ?3,
         consulted_at = ?4 WHERE id = ?5",
        params![
            patch.notes,
            patch.diagnosis,
            patch.prescription,
            patch.consulted_at,
            patch.id.to_string(),
        ],
    )?;
    Ok(changed)
}

/// Returns the number of rows deleted.
pub fn delete_consultation(conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM consultations WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(deleted)
}

fn query_consultations(
    conn: &Connection,
    sql: &str,
    args: impl rusqlite::Params,
) -> Result<Vec<Consultation>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, consultation_row)?;

    let mut consultations = Vec::new();
    for row in rows {
        consultations.push(consultation_from_row(row?)?);
    }
    Ok(consultations)
}

// Internal row type for Consultation mapping
struct ConsultationRow {
    id: String,
    appointment_request_id: String,
    client_id: i64,
    provider_id: i64,
    notes: Option<String>,
    diagnosis: String,
    prescription: Option<String>,
    consulted_at: NaiveDateTime,
    created_at: NaiveDateTime,
}

fn consultation_row(row: &rusqlite::Row<'_>) -> Result<ConsultationRow, rusqlite::Error> {
    Ok(ConsultationRow {
        id: row.get(0)?,
        appointment_request_id: row.get(1)?,
        client_id: row.get(2)?,
        provider_id: row.get(3)?,
        notes: row.get(4)?,
        diagnosis: row.get(5)?,
        prescription: row.get(6)?,
        consulted_at: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn consultation_from_row(row: ConsultationRow) -> Result<Consultation, DatabaseError> {
    Ok(Consultation {
        id: parse_uuid(&row.id)?,
        appointment_request_id: parse_uuid(&row.appointment_request_id)?,
        client_id: row.client_id,
        provider_id: row.provider_id,
        notes: row.notes,
        diagnosis: row.diagnosis,
        prescription: row.prescription,
        consulted_at: row.consulted_at,
        created_at: row.created_at,
    })
}
