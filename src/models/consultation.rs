use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clinical record created once per CONFIRMED appointment request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    pub appointment_request_id: Uuid,
    pub client_id: i64,
    pub provider_id: i64,
    pub notes: Option<String>,
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub consulted_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// Input for creating a consultation. Client and provider references are
/// derived from the linked appointment, never taken from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConsultation {
    pub appointment_request_id: Uuid,
    pub notes: Option<String>,
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub consulted_at: NaiveDateTime,
}

/// In-place edit of an existing consultation's clinical content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationUpdate {
    pub id: Uuid,
    pub notes: Option<String>,
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub consulted_at: NaiveDateTime,
}
