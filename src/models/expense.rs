// src/models/expense.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

// --- CATEGORIAS ---

// Conjunto fechado, o mesmo que o formulário de despesas oferece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ExpenseCategory {
    #[serde(rename = "Luz")]
    Electricity,
    #[serde(rename = "Aluguel")]
    Rent,
    #[serde(rename = "Internet")]
    Internet,
    #[serde(rename = "Gasolina")]
    Fuel,
    #[serde(rename = "Material de Trabalho")]
    WorkSupplies,
    #[serde(rename = "Outros")]
    Other,
}

#[derive(Debug, Error)]
#[error("Categoria de despesa desconhecida: {0}")]
pub struct UnknownCategory(pub String);

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 6] = [
        Self::Electricity,
        Self::Rent,
        Self::Internet,
        Self::Fuel,
        Self::WorkSupplies,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electricity => "Luz",
            Self::Rent => "Aluguel",
            Self::Internet => "Internet",
            Self::Fuel => "Gasolina",
            Self::WorkSupplies => "Material de Trabalho",
            Self::Other => "Outros",
        }
    }
}

impl TryFrom<String> for ExpenseCategory {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- DESPESA ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,

    #[sqlx(try_from = "String")]
    pub category: ExpenseCategory,

    #[schema(example = "200.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub expense_date: NaiveDate,

    #[schema(example = "Compras de produtos")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub category: ExpenseCategory,
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub expense_date: NaiveDate,
    pub notes: Option<String>,
}

// `notes` distingue "não mexer" (None) de "limpar" (Some(None))
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseChanges {
    pub category: Option<ExpenseCategory>,
    pub amount: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date)]
    pub expense_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl ExpenseChanges {
    pub fn apply_to(&self, expense: &mut Expense) {
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(date) = self.expense_date {
            expense.expense_date = date;
        }
        if let Some(notes) = &self.notes {
            expense.notes = notes.clone();
        }
    }
}

// Campo presente (mesmo que `null`) vira Some(..); ausente fica no default (None)
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_use_display_labels_on_the_wire() {
        let json = serde_json::to_string(&ExpenseCategory::WorkSupplies).unwrap();
        assert_eq!(json, "\"Material de Trabalho\"");
        assert_eq!("Aluguel".parse::<ExpenseCategory>().unwrap(), ExpenseCategory::Rent);
        assert!("Mercado".parse::<ExpenseCategory>().is_err());
    }

    #[test]
    fn notes_null_clears_and_missing_keeps() {
        let clear: ExpenseChanges = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        assert_eq!(clear.notes, Some(None));

        let keep: ExpenseChanges = serde_json::from_str(r#"{"amount": 10}"#).unwrap();
        assert_eq!(keep.notes, None);
    }
}
