// src/router.rs

use axum::{
    routing::{get, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

pub fn router(app_state: AppState) -> Router {
    let client_routes = Router::new()
        .route("/", get(handlers::clients::list_clients).post(handlers::clients::create_client))
        .route("/search", get(handlers::clients::search_clients))
        .route(
            "/{id}",
            put(handlers::clients::update_client).delete(handlers::clients::delete_client),
        );

    let procedure_routes = Router::new()
        .route(
            "/",
            get(handlers::procedures::list_procedures).post(handlers::procedures::create_procedure),
        )
        .route(
            "/{id}",
            put(handlers::procedures::update_procedure).delete(handlers::procedures::delete_procedure),
        );

    let appointment_routes = Router::new()
        .route(
            "/",
            get(handlers::appointments::list_appointments)
                .post(handlers::appointments::create_appointment),
        )
        .route(
            "/{id}",
            put(handlers::appointments::update_appointment)
                .delete(handlers::appointments::delete_appointment),
        )
        .route("/{id}/procedures", get(handlers::appointments::list_appointment_procedures));

    let expense_routes = Router::new()
        .route("/", get(handlers::expenses::list_expenses).post(handlers::expenses::create_expense))
        .route("/filter", get(handlers::expenses::filter_expenses))
        .route(
            "/{id}",
            put(handlers::expenses::update_expense).delete(handlers::expenses::delete_expense),
        );

    let report_routes = Router::new()
        .route("/monthly", get(handlers::reports::get_monthly_report))
        .route("/trend", get(handlers::reports::get_trend));

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/dashboard/summary", get(handlers::dashboard::get_summary))
        .nest("/api/clients", client_routes)
        .nest("/api/procedures", procedure_routes)
        .nest("/api/appointments", appointment_routes)
        .nest("/api/expenses", expense_routes)
        .nest("/api/reports", report_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use chrono::{FixedOffset, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::db::FixtureBackend;

    fn seeded_state() -> AppState {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        AppState::with_backend(Arc::new(FixtureBackend::seeded(Utc::now())), offset)
    }

    async fn call(state: AppState, method: &str, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        router(state).oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let resp = call(seeded_state(), "GET", "/api/health", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn listing_clients_reports_status_and_items() {
        let resp = call(seeded_state(), "GET", "/api/clients", None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["status"]["state"], "ready");
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn creating_client_validates_phone() {
        let state = seeded_state();

        let bad = json!({ "fullName": "Joana", "phone": "123" });
        let resp = call(state.clone(), "POST", "/api/clients", Some(bad)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert!(body["details"]["phone"].is_array());

        let good = json!({ "fullName": "  Joana Lima ", "phone": "11912345678" });
        let resp = call(state, "POST", "/api/clients", Some(good)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = json_body(resp).await;
        assert_eq!(body["fullName"], "Joana Lima");
        assert!(body["id"].is_string());
    }

    #[tokio::test]
    async fn deleting_client_with_appointments_conflicts() {
        let state = seeded_state();
        state.store.fetch_clients().await;
        let maria = state
            .store
            .clients()
            .await
            .into_iter()
            .find(|c| c.full_name == "Maria Silva")
            .unwrap();

        let resp = call(state.clone(), "DELETE", &format!("/api/clients/{}", maria.id), None).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body = json_body(resp).await;
        assert!(body["error"].as_str().unwrap().contains("possui agendamentos"));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let uri = format!("/api/expenses/{}", uuid::Uuid::new_v4());
        let resp = call(seeded_state(), "DELETE", &uri, None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn appointment_needs_a_procedure() {
        let state = seeded_state();
        state.store.fetch_clients().await;
        let client_id = state.store.clients().await[0].id;

        let payload = json!({
            "clientId": client_id,
            "appointmentDate": "2025-03-10T14:00:00-03:00",
            "totalValue": 120.0,
            "procedureIds": []
        });
        let resp = call(state, "POST", "/api/appointments", Some(payload)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn appointment_with_unknown_client_is_rejected() {
        let state = seeded_state();
        state.store.fetch_procedures().await;
        let procedure_id = state.store.procedures().await[0].id;

        let payload = json!({
            "clientId": uuid::Uuid::new_v4(),
            "appointmentDate": "2025-03-10T14:00:00-03:00",
            "totalValue": 120.0,
            "procedureIds": [procedure_id]
        });
        let resp = call(state, "POST", "/api/appointments", Some(payload)).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn invalid_report_month_is_bad_request() {
        let resp = call(seeded_state(), "GET", "/api/reports/monthly?month=2025-13", None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn trend_has_six_months() {
        let resp = call(seeded_state(), "GET", "/api/reports/trend?month=2025-03", None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        let months: Vec<_> = body.as_array().unwrap().iter().map(|m| m["month"].clone()).collect();
        assert_eq!(months.first().unwrap(), "2024-10");
        assert_eq!(months.last().unwrap(), "2025-03");
        assert_eq!(months.len(), 6);
    }

    #[tokio::test]
    async fn dashboard_counts_seeded_data() {
        let resp = call(seeded_state(), "GET", "/api/dashboard/summary", None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = json_body(resp).await;
        assert_eq!(body["totalClients"], 2);
        assert_eq!(body["upcomingAppointments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expense_filter_rejects_unknown_category() {
        let resp = call(seeded_state(), "GET", "/api/expenses/filter?category=Viagem", None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = call(seeded_state(), "GET", "/api/expenses/filter?category=&month=", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expense_amount_must_fit_two_decimal_column() {
        let state = seeded_state();
        let expense = |amount: Value| {
            json!({ "category": "Luz", "amount": amount, "expenseDate": "2025-03-05" })
        };

        for amount in [json!(5e28), json!(100000000.0), json!(10.005)] {
            let resp = call(state.clone(), "POST", "/api/expenses", Some(expense(amount))).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            assert!(json_body(resp).await["details"]["amount"].is_array());
        }

        let resp = call(state.clone(), "POST", "/api/expenses", Some(expense(json!(99999999.99)))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        // nada acima do limite entrou, então o dashboard continua somando
        let resp = call(state, "GET", "/api/dashboard/summary", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn client_search_formats_phone() {
        let resp = call(seeded_state(), "GET", "/api/clients/search?q=ana", None).await;
        let body = json_body(resp).await;
        let hits = body.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["fullName"], "Ana Santos");
        assert_eq!(hits[0]["formattedPhone"], "(11) 88888-8888");
    }
}
