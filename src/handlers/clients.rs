// src/handlers/clients.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{
        validators::{validate_not_blank, validate_phone},
        CollectionResponse,
    },
    models::client::{format_phone, Client, ClientChanges, NewClient},
    services::store::CollectionKind,
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(custom(function = "validate_not_blank", message = "Nome completo é obrigatório."))]
    #[schema(example = "Maria Silva")]
    pub full_name: String,

    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "(11) 99999-9999")]
    pub phone: String,
}

impl From<CreateClientPayload> for NewClient {
    fn from(payload: CreateClientPayload) -> Self {
        Self {
            full_name: payload.full_name.trim().to_string(),
            phone: payload.phone.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    #[validate(custom(function = "validate_not_blank", message = "Nome completo é obrigatório."))]
    pub full_name: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

impl From<UpdateClientPayload> for ClientChanges {
    fn from(payload: UpdateClientPayload) -> Self {
        Self {
            full_name: payload.full_name.map(|n| n.trim().to_string()),
            phone: payload.phone.map(|p| p.trim().to_string()),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Trecho do nome ou do telefone
    #[serde(default)]
    pub q: String,
}

// Resultado de busca: a cliente com o telefone já formatado para exibição
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSearchHit {
    #[serde(flatten)]
    pub client: Client,
    #[schema(example = "(11) 99999-9999")]
    pub formatted_phone: String,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clientes",
    responses(
        (status = 200, description = "Recarrega as clientes. Retorna { status, items } (mais recentes primeiro)")
    )
)]
pub async fn list_clients(State(app_state): State<AppState>) -> impl IntoResponse {
    app_state.store.fetch_clients().await;

    let status = app_state.store.status(CollectionKind::Clients).await;
    let items = app_state.store.clients().await;

    Json(CollectionResponse::new(status, items))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clientes",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente cadastrada", body = Client),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state.store.add_client(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clientes",
    request_body = UpdateClientPayload,
    params(("id" = Uuid, Path, description = "ID da cliente")),
    responses(
        (status = 200, description = "Cliente atualizada", body = Client),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrada")
    )
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state.store.update_client(id, payload.into()).await?;

    Ok((StatusCode::OK, Json(client)))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID da cliente")),
    responses(
        (status = 204, description = "Cliente excluída"),
        (status = 404, description = "Cliente não encontrada"),
        (status = 409, description = "Cliente possui agendamentos")
    )
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.store.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/clients/search?q=
#[utoipa::path(
    get,
    path = "/api/clients/search",
    tag = "Clientes",
    params(SearchQuery),
    responses(
        (status = 200, description = "Clientes cujo nome ou telefone combinam com o termo", body = Vec<ClientSearchHit>)
    )
)]
pub async fn search_clients(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let hits: Vec<ClientSearchHit> = app_state
        .report_service
        .search_clients(&query.q)
        .await
        .into_iter()
        .map(|client| ClientSearchHit {
            formatted_phone: format_phone(&client.phone),
            client,
        })
        .collect();

    Json(hits)
}
