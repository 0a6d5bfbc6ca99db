// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;

use crate::{config::AppState, models::report::DashboardStats};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cards do dia e do mês, mais os próximos agendamentos", body = DashboardStats)
    )
)]
pub async fn get_summary(State(app_state): State<AppState>) -> impl IntoResponse {
    let summary = app_state.dashboard_service.get_summary(Utc::now()).await;

    (StatusCode::OK, Json(summary))
}
