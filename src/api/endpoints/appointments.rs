//! Appointment request endpoints.
//!
//! - `POST   /api/appointments` — propose a new request (201)
//! - `GET    /api/appointments` — list all requests
//! - `GET    /api/appointments/:id` — one request
//! - `GET    /api/appointments/client/:client_id` — by client
//! - `GET    /api/appointments/provider/:provider_id` — by provider
//! - `PUT    /api/appointments/:id/confirm` — pick a proposed slot
//! - `PUT    /api/appointments/:id/refuse` — decline
//! - `PUT    /api/appointments/:id/reschedule` — replace the slot set
//! - `DELETE /api/appointments/:id` — cancel

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{AppointmentRequest, NewAppointmentRequest};
use crate::workflow::appointment;

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<AppointmentRequest>,
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub slot_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct RescheduleRequest {
    pub slots: Vec<NaiveDateTime>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `POST /api/appointments` — propose a new appointment request.
pub async fn propose(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentRequest>), ApiError> {
    let mut conn = ctx.open_db()?;
    let created = appointment::propose_appointment(&mut conn, &new)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/appointments` — all requests.
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let appointments = appointment::list_appointments(&conn)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

/// `GET /api/appointments/:id` — one request with its slots.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentRequest>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(appointment::get_appointment(&conn, &id)?))
}

/// `GET /api/appointments/client/:client_id` — requests for a client.
pub async fn by_client(
    State(ctx): State<ApiContext>,
    Path(client_id): Path<i64>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let appointments = appointment::get_appointments_by_client(&conn, client_id)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

/// `GET /api/appointments/provider/:provider_id` — requests for a provider.
pub async fn by_provider(
    State(ctx): State<ApiContext>,
    Path(provider_id): Path<i64>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let appointments = appointment::get_appointments_by_provider(&conn, provider_id)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

/// `PUT /api/appointments/:id/confirm` — confirm on a proposed slot.
pub async fn confirm(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<ConfirmRequest>,
) -> Result<Json<AppointmentRequest>, ApiError> {
    let mut conn = ctx.open_db()?;
    Ok(Json(appointment::confirm_appointment(&mut conn, &id, body.slot_at)?))
}

/// `PUT /api/appointments/:id/refuse` — refuse a pending request.
pub async fn refuse(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentRequest>, ApiError> {
    let mut conn = ctx.open_db()?;
    Ok(Json(appointment::refuse_appointment(&mut conn, &id)?))
}

/// `PUT /api/appointments/:id/reschedule` — replace the proposed slots.
pub async fn reschedule(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<RescheduleRequest>,
) -> Result<Json<AppointmentRequest>, ApiError> {
    let mut conn = ctx.open_db()?;
    Ok(Json(appointment::reschedule_appointment(&mut conn, &id, &body.slots)?))
}

/// `DELETE /api/appointments/:id` — cancel (delete) a request.
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut conn = ctx.open_db()?;
    appointment::cancel_appointment(&mut conn, &id)?;
    Ok(Json(MessageResponse {
        message: "Appointment request deleted",
    }))
}
