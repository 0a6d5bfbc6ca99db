// src/handlers/procedures.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{validators::validate_not_blank, CollectionResponse},
    models::procedure::{NewProcedure, Procedure, ProcedureChanges},
    services::store::CollectionKind,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcedurePayload {
    #[validate(custom(function = "validate_not_blank", message = "Nome do procedimento é obrigatório."))]
    #[schema(example = "Extensão de Cílios")]
    pub name: String,
}

// GET /api/procedures
#[utoipa::path(
    get,
    path = "/api/procedures",
    tag = "Procedimentos",
    responses(
        (status = 200, description = "Recarrega os procedimentos. Retorna { status, items } em ordem alfabética")
    )
)]
pub async fn list_procedures(State(app_state): State<AppState>) -> impl IntoResponse {
    app_state.store.fetch_procedures().await;

    Json(CollectionResponse::new(
        app_state.store.status(CollectionKind::Procedures).await,
        app_state.store.procedures().await,
    ))
}

// POST /api/procedures
#[utoipa::path(
    post,
    path = "/api/procedures",
    tag = "Procedimentos",
    request_body = ProcedurePayload,
    responses(
        (status = 201, description = "Procedimento criado", body = Procedure),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_procedure(
    State(app_state): State<AppState>,
    Json(payload): Json<ProcedurePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new = NewProcedure { name: payload.name.trim().to_string() };
    let procedure = app_state.store.add_procedure(new).await?;

    Ok((StatusCode::CREATED, Json(procedure)))
}

// PUT /api/procedures/{id}
#[utoipa::path(
    put,
    path = "/api/procedures/{id}",
    tag = "Procedimentos",
    request_body = ProcedurePayload,
    params(("id" = Uuid, Path, description = "ID do procedimento")),
    responses(
        (status = 200, description = "Procedimento renomeado", body = Procedure),
        (status = 404, description = "Procedimento não encontrado")
    )
)]
pub async fn update_procedure(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProcedurePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let changes = ProcedureChanges { name: Some(payload.name.trim().to_string()) };
    let procedure = app_state.store.update_procedure(id, changes).await?;

    Ok((StatusCode::OK, Json(procedure)))
}

// DELETE /api/procedures/{id}
#[utoipa::path(
    delete,
    path = "/api/procedures/{id}",
    tag = "Procedimentos",
    params(("id" = Uuid, Path, description = "ID do procedimento")),
    responses(
        (status = 204, description = "Procedimento excluído"),
        (status = 404, description = "Procedimento não encontrado"),
        (status = 409, description = "Procedimento usado em agendamentos")
    )
)]
pub async fn delete_procedure(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.store.delete_procedure(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
