// src/services/report_service.rs

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    models::{
        appointment::Appointment,
        client::{phone_digits, Client},
        expense::{Expense, ExpenseCategory},
        report::{CategoryBreakdown, FilteredExpenses, MonthlyReport, MonthlySummary, ReportMonth, TopClient},
    },
    services::store::{StoreSnapshot, StudioStore},
};

pub const TOP_CLIENTS_LIMIT: usize = 5;
pub const TREND_MONTHS: usize = 6;
pub const UNKNOWN_CLIENT_NAME: &str = "Cliente não encontrado";

#[derive(Clone)]
pub struct ReportService {
    store: Arc<StudioStore>,
    offset: FixedOffset,
}

impl ReportService {
    pub fn new(store: Arc<StudioStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    /// Mês corrente no fuso do estúdio.
    pub fn current_month(&self, now: DateTime<Utc>) -> ReportMonth {
        ReportMonth::of(&now.with_timezone(&self.offset))
    }

    async fn refresh(&self) -> StoreSnapshot {
        tokio::join!(self.store.fetch_appointments(), self.store.fetch_expenses());
        self.store.snapshot().await
    }

    pub async fn monthly_report(&self, month: ReportMonth) -> MonthlyReport {
        let snapshot = self.refresh().await;
        compute_monthly_report(&snapshot, month, self.offset)
    }

    pub async fn trend(&self, current: ReportMonth) -> Vec<MonthlySummary> {
        let snapshot = self.refresh().await;
        compute_trend(&snapshot, current, self.offset)
    }

    pub async fn search_clients(&self, term: &str) -> Vec<Client> {
        self.store.fetch_clients().await;
        search_clients(&self.store.clients().await, term)
    }

    pub async fn filter_expenses(
        &self,
        category: Option<ExpenseCategory>,
        month: Option<ReportMonth>,
    ) -> FilteredExpenses {
        self.store.fetch_expenses().await;
        filter_expenses(&self.store.expenses().await, category, month)
    }
}

// =========================================================================
//  FUNÇÕES PURAS
// =========================================================================

fn completed_in_month<'a>(
    appointments: &'a [Appointment],
    month: ReportMonth,
    offset: FixedOffset,
) -> impl Iterator<Item = &'a Appointment> {
    appointments
        .iter()
        .filter(move |a| a.is_completed() && month.contains(&a.appointment_date.with_timezone(&offset)))
}

fn expenses_in_month(expenses: &[Expense], month: ReportMonth) -> impl Iterator<Item = &Expense> {
    expenses.iter().filter(move |e| month.contains(&e.expense_date))
}

/// Receita do mês: só agendamentos `concluído`.
pub(crate) fn completed_revenue(appointments: &[Appointment], month: ReportMonth, offset: FixedOffset) -> Decimal {
    completed_in_month(appointments, month, offset).map(|a| a.total_value).sum()
}

pub(crate) fn expenses_total(expenses: &[Expense], month: ReportMonth) -> Decimal {
    expenses_in_month(expenses, month).map(|e| e.amount).sum()
}

pub fn compute_monthly_summary(snapshot: &StoreSnapshot, month: ReportMonth, offset: FixedOffset) -> MonthlySummary {
    let revenue = completed_revenue(&snapshot.appointments, month, offset);
    let expenses = expenses_total(&snapshot.expenses, month);

    MonthlySummary { month, revenue, expenses, profit: revenue - expenses }
}

/// Despesas do mês agrupadas por categoria, da maior para a menor.
pub fn compute_expenses_by_category(expenses: &[Expense], month: ReportMonth) -> Vec<CategoryBreakdown> {
    let mut totals: Vec<(ExpenseCategory, Decimal)> = Vec::new();
    for expense in expenses_in_month(expenses, month) {
        match totals.iter_mut().find(|(c, _)| *c == expense.category) {
            Some((_, amount)) => *amount += expense.amount,
            None => totals.push((expense.category, expense.amount)),
        }
    }

    let total: Decimal = totals.iter().map(|(_, amount)| *amount).sum();

    let mut breakdown: Vec<CategoryBreakdown> = totals
        .into_iter()
        .map(|(category, amount)| {
            let percentage = if total.is_zero() {
                Decimal::ZERO
            } else {
                (amount / total * Decimal::ONE_HUNDRED).round_dp(2)
            };
            CategoryBreakdown { category, amount, percentage }
        })
        .collect();

    // sort_by é estável: empates mantêm a ordem de aparição
    breakdown.sort_by(|a, b| b.amount.cmp(&a.amount));
    breakdown
}

/// Top clientes por receita concluída no mês.
pub fn compute_top_clients(appointments: &[Appointment], month: ReportMonth, offset: FixedOffset) -> Vec<TopClient> {
    let mut position: HashMap<Uuid, usize> = HashMap::new();
    let mut ranking: Vec<TopClient> = Vec::new();

    for appointment in completed_in_month(appointments, month, offset) {
        let idx = *position.entry(appointment.client_id).or_insert_with(|| {
            let name = appointment
                .client
                .as_ref()
                .map(|c| c.full_name.clone())
                .unwrap_or_else(|| UNKNOWN_CLIENT_NAME.to_string());
            ranking.push(TopClient {
                client_id: appointment.client_id,
                name,
                total: Decimal::ZERO,
                appointments: 0,
            });
            ranking.len() - 1
        });

        let entry = &mut ranking[idx];
        entry.total += appointment.total_value;
        entry.appointments += 1;
    }

    ranking.sort_by(|a, b| b.total.cmp(&a.total));
    ranking.truncate(TOP_CLIENTS_LIMIT);
    ranking
}

pub fn compute_monthly_report(snapshot: &StoreSnapshot, month: ReportMonth, offset: FixedOffset) -> MonthlyReport {
    MonthlyReport {
        summary: compute_monthly_summary(snapshot, month, offset),
        expenses_by_category: compute_expenses_by_category(&snapshot.expenses, month),
        top_clients: compute_top_clients(&snapshot.appointments, month, offset),
    }
}

/// O mês atual e os 5 anteriores, do mais antigo para o mais recente.
pub fn compute_trend(snapshot: &StoreSnapshot, current: ReportMonth, offset: FixedOffset) -> Vec<MonthlySummary> {
    let mut months = Vec::with_capacity(TREND_MONTHS);
    let mut month = current;
    for _ in 0..TREND_MONTHS {
        months.push(month);
        month = month.previous();
    }
    months.reverse();

    months
        .into_iter()
        .map(|m| compute_monthly_summary(snapshot, m, offset))
        .collect()
}

/// Busca por nome (sem diferenciar maiúsculas) ou por trecho do telefone.
pub fn search_clients(clients: &[Client], term: &str) -> Vec<Client> {
    let term = term.trim();
    if term.is_empty() {
        return clients.to_vec();
    }

    let needle = term.to_lowercase();
    let digits = phone_digits(term);

    clients
        .iter()
        .filter(|c| {
            c.full_name.to_lowercase().contains(&needle)
                || c.phone.contains(term)
                || (!digits.is_empty() && phone_digits(&c.phone).contains(&digits))
        })
        .cloned()
        .collect()
}

pub fn filter_expenses(
    expenses: &[Expense],
    category: Option<ExpenseCategory>,
    month: Option<ReportMonth>,
) -> FilteredExpenses {
    let items: Vec<Expense> = expenses
        .iter()
        .filter(|e| category.is_none_or(|c| e.category == c))
        .filter(|e| month.is_none_or(|m| m.contains(&e.expense_date)))
        .cloned()
        .collect();

    let total = items.iter().map(|e| e.amount).sum();
    FilteredExpenses { items, total }
}
