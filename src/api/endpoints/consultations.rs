//! Consultation endpoints.
//!
//! - `POST   /api/consultations` — create (appointment must be CONFIRMED, 201)
//! - `GET    /api/consultations` — all consultations
//! - `GET    /api/consultations/:id` — one consultation
//! - `GET    /api/consultations/client/:client_id` — by client
//! - `GET    /api/consultations/provider/:provider_id` — by provider
//! - `GET    /api/consultations/appointment/:id` — by appointment request
//! - `PUT    /api/consultations/:id` — full update of clinical content
//! - `DELETE /api/consultations/:id` — delete

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{Consultation, ConsultationUpdate, NewConsultation};
use crate::workflow::consultation;

#[derive(Serialize)]
pub struct ConsultationsResponse {
    pub consultations: Vec<Consultation>,
}

/// Update payload; the consultation id comes from the path.
#[derive(Deserialize)]
pub struct UpdateConsultationRequest {
    pub notes: Option<String>,
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub consulted_at: NaiveDateTime,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `POST /api/consultations` — create a consultation for a CONFIRMED
/// appointment request.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewConsultation>,
) -> Result<(StatusCode, Json<Consultation>), ApiError> {
    let mut conn = ctx.open_db()?;
    let created = consultation::create_consultation(&mut conn, &new)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/consultations` — all consultations.
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<ConsultationsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let consultations = consultation::list_consultations(&conn)?;
    Ok(Json(ConsultationsResponse { consultations }))
}

/// `GET /api/consultations/:id` — one consultation.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Consultation>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(consultation::get_consultation(&conn, &id)?))
}

/// `GET /api/consultations/client/:client_id` — consultations for a client.
pub async fn by_client(
    State(ctx): State<ApiContext>,
    Path(client_id): Path<i64>,
) -> Result<Json<ConsultationsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let consultations = consultation::get_consultations_by_client(&conn, client_id)?;
    Ok(Json(ConsultationsResponse { consultations }))
}

/// `GET /api/consultations/provider/:provider_id` — consultations for a provider.
pub async fn by_provider(
    State(ctx): State<ApiContext>,
    Path(provider_id): Path<i64>,
) -> Result<Json<ConsultationsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let consultations = consultation::get_consultations_by_provider(&conn, provider_id)?;
    Ok(Json(ConsultationsResponse { consultations }))
}

/// `GET /api/consultations/appointment/:id` — consultations for an
/// appointment request.
pub async fn by_appointment(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConsultationsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let consultations = consultation::get_consultations_by_request(&conn, &id)?;
    Ok(Json(ConsultationsResponse { consultations }))
}

/// `PUT /api/consultations/:id` — update clinical content in place.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateConsultationRequest>,
) -> Result<Json<Consultation>, ApiError> {
    let mut conn = ctx.open_db()?;
    let patch = ConsultationUpdate {
        id,
        notes: body.notes,
        diagnosis: body.diagnosis,
        prescription: body.prescription,
        consulted_at: body.consulted_at,
    };
    Ok(Json(consultation::update_consultation(&mut conn, &patch)?))
}

/// `DELETE /api/consultations/:id` — delete a consultation. The owning
/// appointment request keeps its CONSULTED status.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut conn = ctx.open_db()?;
    consultation::delete_consultation(&mut conn, &id)?;
    Ok(Json(MessageResponse {
        message: "Consultation deleted",
    }))
}
