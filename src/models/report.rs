// src/models/report.rs

use std::{fmt, str::FromStr};

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    appointment::Appointment,
    expense::{Expense, ExpenseCategory},
};

// --- MÊS DE REFERÊNCIA ---

// Mês selecionado nos relatórios, no formato "YYYY-MM"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportMonth {
    year: i32,
    month: u32,
}

#[derive(Debug, thiserror::Error)]
#[error("Mês inválido: '{0}' (esperado YYYY-MM)")]
pub struct InvalidMonth(pub String);

impl ReportMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of<D: Datelike>(date: &D) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn contains<D: Datelike>(&self, date: &D) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for ReportMonth {
    type Err = InvalidMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for ReportMonth {
    type Error = InvalidMonth;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReportMonth> for String {
    fn from(month: ReportMonth) -> Self {
        month.to_string()
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// --- DASHBOARD ---

// Os cards do topo + a lista dos próximos atendimentos
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_clients: usize,
    pub today_appointments: usize,
    pub monthly_revenue: Decimal,
    pub monthly_expenses: Decimal,
    pub monthly_balance: Decimal,
    pub upcoming_appointments: Vec<Appointment>,
}

// --- RELATÓRIOS ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    #[schema(value_type = String, example = "2025-03")]
    pub month: ReportMonth,
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: ExpenseCategory,
    pub amount: Decimal,
    // Percentual sobre o total de despesas do mês (0 a 100)
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopClient {
    pub client_id: Uuid,
    pub name: String,
    pub total: Decimal,
    pub appointments: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub summary: MonthlySummary,
    pub expenses_by_category: Vec<CategoryBreakdown>,
    pub top_clients: Vec<TopClient>,
}

// --- FILTRO DE DESPESAS ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilteredExpenses {
    pub items: Vec<Expense>,
    pub total: Decimal,
}
