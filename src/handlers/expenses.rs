// src/handlers/expenses.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{validators::validate_positive, CollectionResponse},
    models::{
        expense::{double_option, Expense, ExpenseCategory, ExpenseChanges, NewExpense},
        report::{FilteredExpenses, ReportMonth},
    },
    services::store::CollectionKind,
};

// =============================================================================
//  PAYLOADS
// =============================================================================

// Observação em branco é gravada como ausente
fn clean_notes(notes: Option<String>) -> Option<String> {
    notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpensePayload {
    pub category: ExpenseCategory,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "200.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub expense_date: NaiveDate,

    pub notes: Option<String>,
}

impl From<CreateExpensePayload> for NewExpense {
    fn from(payload: CreateExpensePayload) -> Self {
        Self {
            category: payload.category,
            amount: payload.amount,
            expense_date: payload.expense_date,
            notes: clean_notes(payload.notes),
        }
    }
}

// `notes: null` limpa a observação; sem o campo, nada muda
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpensePayload {
    pub category: Option<ExpenseCategory>,

    #[validate(custom(function = "validate_positive"))]
    pub amount: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date)]
    pub expense_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl From<UpdateExpensePayload> for ExpenseChanges {
    fn from(payload: UpdateExpensePayload) -> Self {
        Self {
            category: payload.category,
            amount: payload.amount,
            expense_date: payload.expense_date,
            notes: payload.notes.map(clean_notes),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseFilterQuery {
    /// Categoria (ex.: "Aluguel"). Vazio = todas
    pub category: Option<String>,
    /// Mês no formato YYYY-MM. Vazio = todos
    pub month: Option<String>,
}

impl ExpenseFilterQuery {
    fn parse(self) -> Result<(Option<ExpenseCategory>, Option<ReportMonth>), AppError> {
        let category = match self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(raw) => Some(raw.parse::<ExpenseCategory>().map_err(|e| {
                let mut err = ValidationError::new("category");
                err.message = Some(e.to_string().into());
                let mut errors = ValidationErrors::new();
                errors.add("category", err);
                AppError::ValidationError(errors)
            })?),
            None => None,
        };

        let month = match self.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(raw) => Some(raw.parse::<ReportMonth>()?),
            None => None,
        };

        Ok((category, month))
    }
}

// =============================================================================
//  HANDLERS
// =============================================================================

// GET /api/expenses
#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Despesas",
    responses(
        (status = 200, description = "Recarrega as despesas. Retorna { status, items }, mais recentes primeiro")
    )
)]
pub async fn list_expenses(State(app_state): State<AppState>) -> impl IntoResponse {
    app_state.store.fetch_expenses().await;

    Json(CollectionResponse::new(
        app_state.store.status(CollectionKind::Expenses).await,
        app_state.store.expenses().await,
    ))
}

// POST /api/expenses
#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Despesas",
    request_body = CreateExpensePayload,
    responses(
        (status = 201, description = "Despesa registrada", body = Expense),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let expense = app_state.store.add_expense(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

// PUT /api/expenses/{id}
#[utoipa::path(
    put,
    path = "/api/expenses/{id}",
    tag = "Despesas",
    request_body = UpdateExpensePayload,
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses(
        (status = 200, description = "Despesa atualizada", body = Expense),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Despesa não encontrada")
    )
)]
pub async fn update_expense(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let expense = app_state.store.update_expense(id, payload.into()).await?;

    Ok((StatusCode::OK, Json(expense)))
}

// DELETE /api/expenses/{id}
#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    tag = "Despesas",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses(
        (status = 204, description = "Despesa excluída"),
        (status = 404, description = "Despesa não encontrada")
    )
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.store.delete_expense(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/expenses/filter?category=&month=
#[utoipa::path(
    get,
    path = "/api/expenses/filter",
    tag = "Despesas",
    params(ExpenseFilterQuery),
    responses(
        (status = 200, description = "Despesas filtradas e o total do filtro", body = FilteredExpenses),
        (status = 400, description = "Categoria ou mês inválido")
    )
)]
pub async fn filter_expenses(
    State(app_state): State<AppState>,
    Query(query): Query<ExpenseFilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (category, month) = query.parse()?;

    let filtered = app_state.report_service.filter_expenses(category, month).await;

    Ok(Json(filtered))
}
