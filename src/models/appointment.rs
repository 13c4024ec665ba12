use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::RequestStatus;

/// A single candidate date-time attached to an appointment request.
/// Replaced wholesale on reschedule, removed with the owning request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedSlot {
    pub id: Uuid,
    pub appointment_request_id: Uuid,
    pub slot_at: NaiveDateTime,
}

/// Appointment request aggregate: status, proposed slots, and the
/// date-time selected at confirmation.
///
/// `confirmed_at` is `None` unless status is CONFIRMED or CONSULTED. The
/// slot list may be swapped by a reschedule after confirmation history was
/// recorded, so a historical `confirmed_at` is not required to stay a
/// member of the live slot set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub id: Uuid,
    pub client_id: i64,
    pub provider_id: i64,
    pub status: RequestStatus,
    /// Free-text appointment kind, e.g. "ONLINE" or "IN_PERSON".
    pub kind: String,
    pub confirmed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub slots: Vec<ProposedSlot>,
}

/// Input for proposing a new appointment request. Client and provider
/// references are caller-supplied and treated as untrusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointmentRequest {
    pub client_id: i64,
    pub provider_id: i64,
    pub kind: String,
    pub slots: Vec<NaiveDateTime>,
}
