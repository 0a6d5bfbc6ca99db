// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    models::report::{MonthlyReport, MonthlySummary, ReportMonth},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    /// Mês no formato YYYY-MM. Sem o parâmetro, usa o mês atual
    pub month: Option<String>,
}

impl MonthQuery {
    fn resolve(&self, app_state: &AppState) -> Result<ReportMonth, AppError> {
        match self.month.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            Some(raw) => Ok(raw.parse()?),
            None => Ok(app_state.report_service.current_month(Utc::now())),
        }
    }
}

// GET /api/reports/monthly?month=YYYY-MM
#[utoipa::path(
    get,
    path = "/api/reports/monthly",
    tag = "Relatórios",
    params(MonthQuery),
    responses(
        (status = 200, description = "Resumo do mês, despesas por categoria e top 5 clientes", body = MonthlyReport),
        (status = 400, description = "Mês inválido")
    )
)]
pub async fn get_monthly_report(
    State(app_state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let month = query.resolve(&app_state)?;

    let report = app_state.report_service.monthly_report(month).await;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/reports/trend?month=YYYY-MM
#[utoipa::path(
    get,
    path = "/api/reports/trend",
    tag = "Relatórios",
    params(MonthQuery),
    responses(
        (status = 200, description = "Receita, despesas e lucro dos últimos 6 meses, do mais antigo ao mais recente", body = Vec<MonthlySummary>),
        (status = 400, description = "Mês inválido")
    )
)]
pub async fn get_trend(
    State(app_state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, AppError> {
    let month = query.resolve(&app_state)?;

    let trend = app_state.report_service.trend(month).await;

    Ok((StatusCode::OK, Json(trend)))
}
