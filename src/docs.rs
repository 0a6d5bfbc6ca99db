// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Studio Ledger", description = "Gestão de clientes, agenda e finanças do estúdio"),
    paths(
        // --- Clientes ---
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::search_clients,

        // --- Procedimentos ---
        handlers::procedures::list_procedures,
        handlers::procedures::create_procedure,
        handlers::procedures::update_procedure,
        handlers::procedures::delete_procedure,

        // --- Agendamentos ---
        handlers::appointments::list_appointments,
        handlers::appointments::create_appointment,
        handlers::appointments::update_appointment,
        handlers::appointments::delete_appointment,
        handlers::appointments::list_appointment_procedures,

        // --- Despesas ---
        handlers::expenses::list_expenses,
        handlers::expenses::create_expense,
        handlers::expenses::update_expense,
        handlers::expenses::delete_expense,
        handlers::expenses::filter_expenses,

        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- Relatórios ---
        handlers::reports::get_monthly_report,
        handlers::reports::get_trend,
    ),
    components(
        schemas(
            // --- Models ---
            models::client::Client,
            models::procedure::Procedure,
            models::appointment::Appointment,
            models::appointment::AppointmentProcedure,
            models::expense::ExpenseCategory,
            models::expense::Expense,

            // --- Relatórios ---
            models::report::DashboardStats,
            models::report::MonthlySummary,
            models::report::CategoryBreakdown,
            models::report::TopClient,
            models::report::MonthlyReport,
            models::report::FilteredExpenses,

            // --- Payloads ---
            handlers::clients::CreateClientPayload,
            handlers::clients::UpdateClientPayload,
            handlers::clients::ClientSearchHit,
            handlers::procedures::ProcedurePayload,
            handlers::appointments::CreateAppointmentPayload,
            handlers::appointments::UpdateAppointmentPayload,
            handlers::expenses::CreateExpensePayload,
            handlers::expenses::UpdateExpensePayload,
        )
    ),
    tags(
        (name = "Clientes", description = "Cadastro de clientes"),
        (name = "Procedimentos", description = "Catálogo de procedimentos"),
        (name = "Agendamentos", description = "Agenda e procedimentos realizados"),
        (name = "Despesas", description = "Despesas do estúdio"),
        (name = "Dashboard", description = "Indicadores do dia e do mês"),
        (name = "Relatórios", description = "Relatório mensal e tendência de 6 meses")
    )
)]
pub struct ApiDoc;
