// src/handlers/appointments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{validators::validate_positive, CollectionResponse},
    models::appointment::{
        Appointment, AppointmentChanges, AppointmentProcedure, AppointmentStatus, NewAppointment,
    },
    services::store::CollectionKind,
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentPayload {
    pub client_id: Uuid,

    #[schema(example = "2025-03-10T14:00:00-03:00")]
    pub appointment_date: DateTime<Utc>,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "150.00")]
    pub total_value: Decimal,

    // Texto livre; ausente ou vazio vira "agendado"
    #[schema(example = "agendado")]
    pub status: Option<String>,

    #[validate(length(min = 1, message = "Pelo menos um procedimento deve ser selecionado."))]
    pub procedure_ids: Vec<Uuid>,
}

fn parse_status(raw: Option<String>) -> Option<AppointmentStatus> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(AppointmentStatus::from)
}

impl CreateAppointmentPayload {
    fn into_parts(self) -> (NewAppointment, Vec<Uuid>) {
        let new = NewAppointment {
            client_id: self.client_id,
            appointment_date: self.appointment_date,
            total_value: self.total_value,
            status: parse_status(self.status).unwrap_or_default(),
        };
        (new, self.procedure_ids)
    }
}

// Campos ausentes ficam como estão. `procedureIds`, se vier, substitui o conjunto inteiro.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentPayload {
    pub client_id: Option<Uuid>,
    pub appointment_date: Option<DateTime<Utc>>,

    #[validate(custom(function = "validate_positive"))]
    pub total_value: Option<Decimal>,

    #[schema(example = "concluído")]
    pub status: Option<String>,

    #[validate(length(min = 1, message = "Pelo menos um procedimento deve ser selecionado."))]
    pub procedure_ids: Option<Vec<Uuid>>,
}

impl UpdateAppointmentPayload {
    fn into_parts(self) -> (AppointmentChanges, Option<Vec<Uuid>>) {
        let changes = AppointmentChanges {
            client_id: self.client_id,
            appointment_date: self.appointment_date,
            total_value: self.total_value,
            status: parse_status(self.status),
        };
        (changes, self.procedure_ids)
    }
}

// =============================================================================
//  HANDLERS
// =============================================================================

// GET /api/appointments
#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Agendamentos",
    responses(
        (status = 200, description = "Recarrega os agendamentos (com cliente e procedimentos). Retorna { status, items }, mais recentes primeiro")
    )
)]
pub async fn list_appointments(State(app_state): State<AppState>) -> impl IntoResponse {
    app_state.store.fetch_appointments().await;

    Json(CollectionResponse::new(
        app_state.store.status(CollectionKind::Appointments).await,
        app_state.store.appointments().await,
    ))
}

// POST /api/appointments
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Agendamentos",
    request_body = CreateAppointmentPayload,
    responses(
        (status = 201, description = "Agendamento criado", body = Appointment),
        (status = 400, description = "Dados inválidos"),
        (status = 422, description = "Cliente ou procedimento inexistente")
    )
)]
pub async fn create_appointment(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (new, procedure_ids) = payload.into_parts();
    let appointment = app_state.store.add_appointment(new, procedure_ids).await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

// PUT /api/appointments/{id}
#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    tag = "Agendamentos",
    request_body = UpdateAppointmentPayload,
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Agendamento atualizado", body = Appointment),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Agendamento não encontrado"),
        (status = 422, description = "Cliente ou procedimento inexistente")
    )
)]
pub async fn update_appointment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAppointmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (changes, procedure_ids) = payload.into_parts();
    let appointment = app_state.store.update_appointment(id, changes, procedure_ids).await?;

    Ok((StatusCode::OK, Json(appointment)))
}

// DELETE /api/appointments/{id}
#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    tag = "Agendamentos",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 204, description = "Agendamento excluído"),
        (status = 404, description = "Agendamento não encontrado")
    )
)]
pub async fn delete_appointment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.store.delete_appointment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/appointments/{id}/procedures
#[utoipa::path(
    get,
    path = "/api/appointments/{id}/procedures",
    tag = "Agendamentos",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Linhas da associação agendamento/procedimento", body = Vec<AppointmentProcedure>)
    )
)]
pub async fn list_appointment_procedures(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let links = app_state.store.appointment_procedure_links(id).await?;
    Ok(Json(links))
}
