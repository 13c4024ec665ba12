use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse_uuid;
use crate::db::DatabaseError;
use crate::models::enums::RequestStatus;
use crate::models::{AppointmentRequest, ProposedSlot};

const REQUEST_COLUMNS: &str =
    "id, client_id, provider_id, status, kind, confirmed_at, created_at";

pub fn insert_appointment_request(
    conn: &Connection,
    client_id: i64,
    provider_id: i64,
    kind: &str,
    status: RequestStatus,
    created_at: NaiveDateTime,
) -> Result<Uuid, DatabaseError> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO appointment_requests (id, client_id, provider_id, status, kind, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id.to_string(), client_id, provider_id, status.as_str(), kind, created_at],
    )?;
    Ok(id)
}

/// Stores one slot row per date-time, in the order given. The caller has
/// already validated distinctness; nothing is dropped here.
pub fn insert_proposed_slots(
    conn: &Connection,
    request_id: &Uuid,
    times: &[NaiveDateTime],
) -> Result<Vec<ProposedSlot>, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO proposed_slots (id, appointment_request_id, slot_at) VALUES (?1, ?2, ?3)",
    )?;

    let mut slots = Vec::with_capacity(times.len());
    for time in times {
        let id = Uuid::new_v4();
        stmt.execute(params![id.to_string(), request_id.to_string(), time])?;
        slots.push(ProposedSlot {
            id,
            appointment_request_id: *request_id,
            slot_at: *time,
        });
    }
    Ok(slots)
}

pub fn get_proposed_slots(
    conn: &Connection,
    request_id: &Uuid,
) -> Result<Vec<ProposedSlot>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, appointment_request_id, slot_at FROM proposed_slots
         WHERE appointment_request_id = ?1 ORDER BY slot_at ASC",
    )?;

    let rows = stmt.query_map(params![request_id.to_string()], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, NaiveDateTime>(2)?))
    })?;

    let mut slots = Vec::new();
    for row in rows {
        let (id, req_id, slot_at) = row?;
        slots.push(ProposedSlot {
            id: parse_uuid(&id)?,
            appointment_request_id: parse_uuid(&req_id)?,
            slot_at,
        });
    }
    Ok(slots)
}

pub fn delete_proposed_slots(conn: &Connection, request_id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM proposed_slots WHERE appointment_request_id = ?1",
        params![request_id.to_string()],
    )?;
    Ok(())
}

/// Fetches a request hydrated with its slot list.
pub fn get_appointment_request(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<AppointmentRequest>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REQUEST_COLUMNS} FROM appointment_requests WHERE id = ?1"
    ))?;

    let mut rows = stmt.query_map(params![id.to_string()], request_row)?;
    match rows.next() {
        Some(row) => {
            let mut req = request_from_row(row?)?;
            req.slots = get_proposed_slots(conn, &req.id)?;
            Ok(Some(req))
        }
        None => Ok(None),
    }
}

pub fn list_appointment_requests(
    conn: &Connection,
) -> Result<Vec<AppointmentRequest>, DatabaseError> {
    query_requests(conn, &format!(
        "SELECT {REQUEST_COLUMNS} FROM appointment_requests ORDER BY created_at DESC"
    ), params![])
}

pub fn get_requests_by_client(
    conn: &Connection,
    client_id: i64,
) -> Result<Vec<AppointmentRequest>, DatabaseError> {
    query_requests(conn, &format!(
        "SELECT {REQUEST_COLUMNS} FROM appointment_requests
         WHERE client_id = ?1 ORDER BY created_at DESC"
    ), params![client_id])
}

pub fn get_requests_by_provider(
    conn: &Connection,
    provider_id: i64,
) -> Result<Vec<AppointmentRequest>, DatabaseError> {
    query_requests(conn, &format!(
        "SELECT {REQUEST_COLUMNS} FROM appointment_requests
         WHERE provider_id = ?1 ORDER BY created_at DESC"
    ), params![provider_id])
}

/// Writes status and confirmed_at together; the pair is the workflow's
/// single consistency point. Returns the number of rows changed.
pub fn update_request_status(
    conn: &Connection,
    id: &Uuid,
    status: RequestStatus,
    confirmed_at: Option<NaiveDateTime>,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointment_requests SET status = ?1, confirmed_at = ?2 WHERE id = ?3",
        params![status.as_str(), confirmed_at, id.to_string()],
    )?;
    Ok(changed)
}

/// Returns the number of rows deleted; slot rows cascade.
pub fn delete_appointment_request(conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM appointment_requests WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(deleted)
}

fn query_requests(
    conn: &Connection,
    sql: &str,
    args: impl rusqlite::Params,
) -> Result<Vec<AppointmentRequest>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, request_row)?;

    let mut requests = Vec::new();
    for row in rows {
        let mut req = request_from_row(row?)?;
        req.slots = get_proposed_slots(conn, &req.id)?;
        requests.push(req);
    }
    Ok(requests)
}

// Internal row type for AppointmentRequest mapping
struct RequestRow {
    id: String,
    client_id: i64,
    provider_id: i64,
    status: String,
    kind: String,
    confirmed_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
}

fn request_row(row: &rusqlite::Row<'_>) -> Result<RequestRow, rusqlite::Error> {
    Ok(RequestRow {
        id: row.get(0)?,
        client_id: row.get(1)?,
        provider_id: row.get(2)?,
        status: row.get(3)?,
        kind: row.get(4)?,
        confirmed_at: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn request_from_row(row: RequestRow) -> Result<AppointmentRequest, DatabaseError> {
    Ok(AppointmentRequest {
        id: parse_uuid(&row.id)?,
        client_id: row.client_id,
        provider_id: row.provider_id,
        status: RequestStatus::from_str(&row.status)?,
        kind: row.kind,
        confirmed_at: row.confirmed_at,
        created_at: row.created_at,
        slots: Vec::new(),
    })
}
