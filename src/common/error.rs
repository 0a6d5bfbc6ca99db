// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::report::InvalidMonth;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    InvalidMonth(#[from] InvalidMonth),

    // --- Integridade (checada antes de qualquer DELETE) ---
    #[error("Este cliente não pode ser excluído pois possui agendamentos associados.")]
    ClientHasAppointments,

    #[error("Este procedimento não pode ser excluído pois está associado a um ou mais agendamentos.")]
    ProcedureInUse,

    #[error("Registro não encontrado")]
    NotFound,

    // Chave estrangeira apontando para um registro que não existe
    #[error("Referência inválida: {0}")]
    InvalidReference(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Erro de integridade referencial (delete que deixaria órfãos)
    pub fn is_integrity(&self) -> bool {
        matches!(self, AppError::ClientHasAppointments | AppError::ProcedureInUse)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidMonth(ref e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ref e @ (AppError::ClientHasAppointments | AppError::ProcedureInUse) => {
                (StatusCode::CONFLICT, e.to_string())
            }
            ref e @ AppError::NotFound => (StatusCode::NOT_FOUND, e.to_string()),
            ref e @ AppError::InvalidReference(_) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),

            // Todo o resto vira 500. O detalhe vai para o log, não para o cliente.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
