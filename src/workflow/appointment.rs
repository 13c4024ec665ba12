//! Appointment request state machine.
//!
//! ```text
//!         propose
//!   [ ] ----------> PENDING
//!                    |   |
//!            confirm |   | refuse
//!                    v   v
//!               CONFIRMED  REFUSED (terminal)
//!                    |
//!      create_consultation (via mark_consulted)
//!                    v
//!                CONSULTED (terminal)
//!
//!   PENDING, CONFIRMED --reschedule--> PENDING
//!   any status --cancel--> deleted
//! ```

use chrono::{Local, NaiveDateTime};
use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use super::WorkflowError;
use crate::db::repository;
use crate::models::enums::RequestStatus;
use crate::models::{AppointmentRequest, NewAppointmentRequest};

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Shared slot validation for propose and reschedule: at least one slot,
/// none in the past, pairwise distinct.
fn validate_slots(slots: &[NaiveDateTime], reference: NaiveDateTime) -> Result<(), WorkflowError> {
    if slots.is_empty() {
        return Err(WorkflowError::Validation(
            "at least one proposed slot is required".into(),
        ));
    }
    for (i, slot) in slots.iter().enumerate() {
        if *slot < reference {
            return Err(WorkflowError::Validation(format!(
                "proposed slot {slot} is in the past"
            )));
        }
        if slots[..i].contains(slot) {
            return Err(WorkflowError::Validation(format!(
                "duplicate proposed slot {slot}"
            )));
        }
    }
    Ok(())
}

/// Creates a PENDING request with its proposed slots in one transaction.
/// Client and provider references are untrusted caller input.
pub fn propose_appointment(
    conn: &mut Connection,
    new: &NewAppointmentRequest,
) -> Result<AppointmentRequest, WorkflowError> {
    if new.client_id <= 0 {
        return Err(WorkflowError::Validation("invalid client reference".into()));
    }
    if new.provider_id <= 0 {
        return Err(WorkflowError::Validation("invalid provider reference".into()));
    }
    if new.kind.trim().is_empty() {
        return Err(WorkflowError::Validation("appointment kind is required".into()));
    }
    validate_slots(&new.slots, now())?;

    let created_at = now();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let id = repository::insert_appointment_request(
        &tx,
        new.client_id,
        new.provider_id,
        &new.kind,
        RequestStatus::Pending,
        created_at,
    )?;
    let slots = repository::insert_proposed_slots(&tx, &id, &new.slots)?;
    tx.commit()?;

    tracing::info!(
        request = %id,
        client = new.client_id,
        provider = new.provider_id,
        slots = slots.len(),
        "appointment request proposed"
    );

    Ok(AppointmentRequest {
        id,
        client_id: new.client_id,
        provider_id: new.provider_id,
        status: RequestStatus::Pending,
        kind: new.kind.clone(),
        confirmed_at: None,
        created_at,
        slots,
    })
}

/// Confirms a PENDING request on one of its proposed slots.
///
/// The chosen date-time must be a member of the proposed-slot set; a miss
/// is a validation error, not a state conflict.
pub fn confirm_appointment(
    conn: &mut Connection,
    id: &Uuid,
    chosen: NaiveDateTime,
) -> Result<AppointmentRequest, WorkflowError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut req = repository::get_appointment_request(&tx, id)?
        .ok_or_else(|| WorkflowError::not_found("appointment request", id))?;

    if req.status != RequestStatus::Pending {
        return Err(WorkflowError::StateConflict(format!(
            "only PENDING appointment requests can be confirmed; current status: {}",
            req.status.as_str()
        )));
    }
    if !req.slots.iter().any(|s| s.slot_at == chosen) {
        return Err(WorkflowError::Validation(format!(
            "{chosen} is not one of the proposed slots"
        )));
    }

    repository::update_request_status(&tx, id, RequestStatus::Confirmed, Some(chosen))?;
    tx.commit()?;

    tracing::info!(request = %id, confirmed_at = %chosen, "appointment request confirmed");

    req.status = RequestStatus::Confirmed;
    req.confirmed_at = Some(chosen);
    Ok(req)
}

/// Refuses a PENDING request. REFUSED is terminal.
pub fn refuse_appointment(
    conn: &mut Connection,
    id: &Uuid,
) -> Result<AppointmentRequest, WorkflowError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut req = repository::get_appointment_request(&tx, id)?
        .ok_or_else(|| WorkflowError::not_found("appointment request", id))?;

    if req.status != RequestStatus::Pending {
        return Err(WorkflowError::StateConflict(format!(
            "only PENDING appointment requests can be refused; current status: {}",
            req.status.as_str()
        )));
    }

    repository::update_request_status(&tx, id, RequestStatus::Refused, None)?;
    tx.commit()?;

    tracing::info!(request = %id, "appointment request refused");

    req.status = RequestStatus::Refused;
    req.confirmed_at = None;
    Ok(req)
}

/// Replaces the slot set wholesale, clears the confirmed date-time and
/// resets the request to PENDING. Allowed from PENDING or CONFIRMED.
pub fn reschedule_appointment(
    conn: &mut Connection,
    id: &Uuid,
    new_slots: &[NaiveDateTime],
) -> Result<AppointmentRequest, WorkflowError> {
    validate_slots(new_slots, now())?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut req = repository::get_appointment_request(&tx, id)?
        .ok_or_else(|| WorkflowError::not_found("appointment request", id))?;

    if req.status.is_terminal() {
        return Err(WorkflowError::StateConflict(format!(
            "only PENDING or CONFIRMED appointment requests can be rescheduled; \
             current status: {}",
            req.status.as_str()
        )));
    }

    repository::delete_proposed_slots(&tx, id)?;
    let slots = repository::insert_proposed_slots(&tx, id, new_slots)?;
    repository::update_request_status(&tx, id, RequestStatus::Pending, None)?;
    tx.commit()?;

    tracing::info!(request = %id, slots = slots.len(), "appointment request rescheduled");

    req.status = RequestStatus::Pending;
    req.confirmed_at = None;
    req.slots = slots;
    Ok(req)
}

/// Deletes the request and its proposed slots from any status. Irreversible.
pub fn cancel_appointment(conn: &mut Connection, id: &Uuid) -> Result<(), WorkflowError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let deleted = repository::delete_appointment_request(&tx, id)?;
    if deleted == 0 {
        return Err(WorkflowError::not_found("appointment request", id));
    }
    tx.commit()?;

    tracing::info!(request = %id, "appointment request cancelled");
    Ok(())
}

/// Flips a CONFIRMED request to CONSULTED.
///
/// Crate-private on purpose: the consultation workflow is the sole caller,
/// inside its own transaction. Exposing a general status setter would
/// bypass the consultation-creation guard.
pub(crate) fn mark_consulted(conn: &Connection, id: &Uuid) -> Result<(), WorkflowError> {
    let req = repository::get_appointment_request(conn, id)?
        .ok_or_else(|| WorkflowError::not_found("appointment request", id))?;

    if req.status != RequestStatus::Confirmed {
        return Err(WorkflowError::StateConflict(format!(
            "only CONFIRMED appointment requests can be marked CONSULTED; current status: {}",
            req.status.as_str()
        )));
    }

    repository::update_request_status(conn, id, RequestStatus::Consulted, req.confirmed_at)?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<AppointmentRequest, WorkflowError> {
    repository::get_appointment_request(conn, id)?
        .ok_or_else(|| WorkflowError::not_found("appointment request", id))
}

pub fn list_appointments(conn: &Connection) -> Result<Vec<AppointmentRequest>, WorkflowError> {
    Ok(repository::list_appointment_requests(conn)?)
}

pub fn get_appointments_by_client(
    conn: &Connection,
    client_id: i64,
) -> Result<Vec<AppointmentRequest>, WorkflowError> {
    Ok(repository::get_requests_by_client(conn, client_id)?)
}

pub fn get_appointments_by_provider(
    conn: &Connection,
    provider_id: i64,
) -> Result<Vec<AppointmentRequest>, WorkflowError> {
    Ok(repository::get_requests_by_provider(conn, provider_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::db::sqlite::open_memory_database;

    // Fixed hour on a future day keeps date arithmetic in the tests away
    // from midnight boundaries.
    fn future(days: i64, hour: u32) -> NaiveDateTime {
        (now() + Duration::days(days)).date().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn new_request(slots: Vec<NaiveDateTime>) -> NewAppointmentRequest {
        NewAppointmentRequest {
            client_id: 1,
            provider_id: 2,
            kind: "ONLINE".into(),
            slots,
        }
    }

    #[test]
    fn propose_creates_pending_request_with_slots() {
        let mut conn = open_memory_database().unwrap();
        let req =
            propose_appointment(&mut conn, &new_request(vec![future(7, 0), future(8, 0)])).unwrap();

        assert_eq!(req.status, RequestStatus::Pending);
        assert!(req.confirmed_at.is_none());
        assert_eq!(req.slots.len(), 2);

        let stored = get_appointment(&conn, &req.id).unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
        assert_eq!(stored.slots.len(), 2);
        assert_eq!(stored.kind, "ONLINE");
    }

    #[test]
    fn propose_rejects_invalid_references() {
        let mut conn = open_memory_database().unwrap();

        let mut bad = new_request(vec![future(7, 0)]);
        bad.client_id = 0;
        assert!(matches!(
            propose_appointment(&mut conn, &bad),
            Err(WorkflowError::Validation(_))
        ));

        let mut bad = new_request(vec![future(7, 0)]);
        bad.provider_id = -3;
        assert!(matches!(
            propose_appointment(&mut conn, &bad),
            Err(WorkflowError::Validation(_))
        ));

        let mut bad = new_request(vec![future(7, 0)]);
        bad.kind = "  ".into();
        assert!(matches!(
            propose_appointment(&mut conn, &bad),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn propose_rejects_empty_slot_list() {
        let mut conn = open_memory_database().unwrap();
        assert!(matches!(
            propose_appointment(&mut conn, &new_request(vec![])),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn propose_rejects_past_slot() {
        let mut conn = open_memory_database().unwrap();
        let yesterday = now() - Duration::days(1);
        assert!(matches!(
            propose_appointment(&mut conn, &new_request(vec![yesterday])),
            Err(WorkflowError::Validation(_))
        ));
    }

    // Scenario B: identical slots are rejected and nothing is persisted.
    #[test]
    fn propose_rejects_duplicate_slots_without_persisting() {
        let mut conn = open_memory_database().unwrap();
        let slot = future(7, 0);
        assert!(matches!(
            propose_appointment(&mut conn, &new_request(vec![slot, slot])),
            Err(WorkflowError::Validation(_))
        ));
        assert!(list_appointments(&conn).unwrap().is_empty());
    }

    #[test]
    fn confirm_requires_pending() {
        let mut conn = open_memory_database().unwrap();
        let slot = future(7, 0);
        let req = propose_appointment(&mut conn, &new_request(vec![slot])).unwrap();

        let confirmed = confirm_appointment(&mut conn, &req.id, slot).unwrap();
        assert_eq!(confirmed.status, RequestStatus::Confirmed);
        assert_eq!(confirmed.confirmed_at, Some(slot));

        // Second confirm hits a state conflict, as does confirm after refuse.
        assert!(matches!(
            confirm_appointment(&mut conn, &req.id, slot),
            Err(WorkflowError::StateConflict(_))
        ));

        let other = propose_appointment(&mut conn, &new_request(vec![slot])).unwrap();
        refuse_appointment(&mut conn, &other.id).unwrap();
        assert!(matches!(
            confirm_appointment(&mut conn, &other.id, slot),
            Err(WorkflowError::StateConflict(_))
        ));
    }

    #[test]
    fn confirm_enforces_slot_membership() {
        let mut conn = open_memory_database().unwrap();
        let req = propose_appointment(&mut conn, &new_request(vec![future(7, 0)])).unwrap();

        let err = confirm_appointment(&mut conn, &req.id, future(30, 0)).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        // Still pending — the failed confirm must not leak state.
        let stored = get_appointment(&conn, &req.id).unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
        assert!(stored.confirmed_at.is_none());
    }

    #[test]
    fn confirm_unknown_request_is_not_found() {
        let mut conn = open_memory_database().unwrap();
        assert!(matches!(
            confirm_appointment(&mut conn, &Uuid::new_v4(), future(7, 0)),
            Err(WorkflowError::NotFound { .. })
        ));
    }

    #[test]
    fn refuse_requires_pending() {
        let mut conn = open_memory_database().unwrap();
        let slot = future(7, 0);
        let req = propose_appointment(&mut conn, &new_request(vec![slot])).unwrap();

        let refused = refuse_appointment(&mut conn, &req.id).unwrap();
        assert_eq!(refused.status, RequestStatus::Refused);
        assert!(refused.confirmed_at.is_none());

        assert!(matches!(
            refuse_appointment(&mut conn, &req.id),
            Err(WorkflowError::StateConflict(_))
        ));

        let confirmed = propose_appointment(&mut conn, &new_request(vec![slot])).unwrap();
        confirm_appointment(&mut conn, &confirmed.id, slot).unwrap();
        assert!(matches!(
            refuse_appointment(&mut conn, &confirmed.id),
            Err(WorkflowError::StateConflict(_))
        ));
    }

    #[test]
    fn reschedule_confirmed_clears_confirmation_and_swaps_slots() {
        let mut conn = open_memory_database().unwrap();
        let slot = future(7, 0);
        let req = propose_appointment(&mut conn, &new_request(vec![slot, future(8, 0)])).unwrap();
        confirm_appointment(&mut conn, &req.id, slot).unwrap();

        let fresh = vec![future(14, 0), future(15, 0), future(16, 0)];
        let rescheduled = reschedule_appointment(&mut conn, &req.id, &fresh).unwrap();

        assert_eq!(rescheduled.status, RequestStatus::Pending);
        assert!(rescheduled.confirmed_at.is_none());
        assert_eq!(rescheduled.slots.len(), 3);

        // Old slots are gone, new slots are present, no duplicates across the swap.
        let stored = get_appointment(&conn, &req.id).unwrap();
        assert_eq!(stored.slots.len(), 3);
        assert!(stored.slots.iter().all(|s| fresh.contains(&s.slot_at)));
        assert!(!stored.slots.iter().any(|s| s.slot_at == slot));
    }

    #[test]
    fn reschedule_rejects_terminal_status() {
        let mut conn = open_memory_database().unwrap();
        let req = propose_appointment(&mut conn, &new_request(vec![future(7, 0)])).unwrap();
        refuse_appointment(&mut conn, &req.id).unwrap();

        assert!(matches!(
            reschedule_appointment(&mut conn, &req.id, &[future(14, 0)]),
            Err(WorkflowError::StateConflict(_))
        ));
    }

    #[test]
    fn reschedule_validates_new_slots() {
        let mut conn = open_memory_database().unwrap();
        let req = propose_appointment(&mut conn, &new_request(vec![future(7, 0)])).unwrap();

        let dup = future(14, 0);
        assert!(matches!(
            reschedule_appointment(&mut conn, &req.id, &[dup, dup]),
            Err(WorkflowError::Validation(_))
        ));
        assert!(matches!(
            reschedule_appointment(&mut conn, &req.id, &[]),
            Err(WorkflowError::Validation(_))
        ));

        // Failed reschedule leaves the original slot set intact.
        assert_eq!(get_appointment(&conn, &req.id).unwrap().slots.len(), 1);
    }

    #[test]
    fn cancel_deletes_in_any_status() {
        let mut conn = open_memory_database().unwrap();
        let slot = future(7, 0);

        let pending = propose_appointment(&mut conn, &new_request(vec![slot])).unwrap();
        cancel_appointment(&mut conn, &pending.id).unwrap();
        assert!(matches!(
            get_appointment(&conn, &pending.id),
            Err(WorkflowError::NotFound { .. })
        ));

        let confirmed = propose_appointment(&mut conn, &new_request(vec![slot])).unwrap();
        confirm_appointment(&mut conn, &confirmed.id, slot).unwrap();
        cancel_appointment(&mut conn, &confirmed.id).unwrap();

        assert!(matches!(
            cancel_appointment(&mut conn, &Uuid::new_v4()),
            Err(WorkflowError::NotFound { .. })
        ));
    }

    #[test]
    fn mark_consulted_requires_confirmed() {
        let mut conn = open_memory_database().unwrap();
        let slot = future(7, 0);
        let req = propose_appointment(&mut conn, &new_request(vec![slot])).unwrap();

        assert!(matches!(
            mark_consulted(&conn, &req.id),
            Err(WorkflowError::StateConflict(_))
        ));

        confirm_appointment(&mut conn, &req.id, slot).unwrap();
        mark_consulted(&conn, &req.id).unwrap();

        let stored = get_appointment(&conn, &req.id).unwrap();
        assert_eq!(stored.status, RequestStatus::Consulted);
        // The historical confirmed date survives the flip.
        assert_eq!(stored.confirmed_at, Some(slot));

        assert!(matches!(
            mark_consulted(&conn, &req.id),
            Err(WorkflowError::StateConflict(_))
        ));
    }

    #[test]
    fn queries_filter_by_owner() {
        let mut conn = open_memory_database().unwrap();
        let slot = future(7, 0);
        propose_appointment(&mut conn, &new_request(vec![slot])).unwrap();
        propose_appointment(
            &mut conn,
            &NewAppointmentRequest {
                client_id: 9,
                provider_id: 2,
                kind: "IN_PERSON".into(),
                slots: vec![slot],
            },
        )
        .unwrap();

        assert_eq!(list_appointments(&conn).unwrap().len(), 2);
        assert_eq!(get_appointments_by_client(&conn, 1).unwrap().len(), 1);
        assert_eq!(get_appointments_by_client(&conn, 9).unwrap().len(), 1);
        assert_eq!(get_appointments_by_provider(&conn, 2).unwrap().len(), 2);
        assert_eq!(get_appointments_by_provider(&conn, 7).unwrap().len(), 0);
    }
}
