// src/services/dashboard_service.rs

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use crate::{
    models::report::{DashboardStats, ReportMonth},
    services::{
        report_service::{completed_revenue, expenses_total},
        store::{StoreSnapshot, StudioStore},
    },
};

/// Quantos próximos agendamentos aparecem no dashboard.
pub const UPCOMING_LIMIT: usize = 5;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<StudioStore>,
    offset: FixedOffset,
}

impl DashboardService {
    pub fn new(store: Arc<StudioStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    /// Recarrega clientes, agendamentos e despesas (em paralelo) e calcula os cards.
    pub async fn get_summary(&self, now: DateTime<Utc>) -> DashboardStats {
        tokio::join!(
            self.store.fetch_clients(),
            self.store.fetch_appointments(),
            self.store.fetch_expenses(),
        );

        let snapshot = self.store.snapshot().await;
        compute_dashboard_stats(&snapshot, now.with_timezone(&self.offset))
    }
}

/// Cards do dashboard, calculados sobre o snapshot.
///
/// "Hoje" e "mês atual" são avaliados no fuso de `now`.
pub fn compute_dashboard_stats(snapshot: &StoreSnapshot, now: DateTime<FixedOffset>) -> DashboardStats {
    let offset = *now.offset();
    let today = now.date_naive();
    let month = ReportMonth::of(&now);

    let today_appointments = snapshot
        .appointments
        .iter()
        .filter(|a| a.appointment_date.with_timezone(&offset).date_naive() == today)
        .count();

    let monthly_revenue = completed_revenue(&snapshot.appointments, month, offset);
    let monthly_expenses = expenses_total(&snapshot.expenses, month);

    // Só os agendados estritamente no futuro, do mais próximo ao mais distante
    let now_utc = now.with_timezone(&Utc);
    let mut upcoming: Vec<_> = snapshot
        .appointments
        .iter()
        .filter(|a| a.is_scheduled() && a.appointment_date > now_utc)
        .cloned()
        .collect();
    upcoming.sort_by(|a, b| a.appointment_date.cmp(&b.appointment_date));
    upcoming.truncate(UPCOMING_LIMIT);

    DashboardStats {
        total_clients: snapshot.clients.len(),
        today_appointments,
        monthly_revenue,
        monthly_expenses,
        monthly_balance: monthly_revenue - monthly_expenses,
        upcoming_appointments: upcoming,
    }
}
