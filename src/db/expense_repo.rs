// src/db/expense_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::ensure_affected, error::AppError},
    models::expense::{Expense, ExpenseChanges, NewExpense},
};

const EXPENSE_COLUMNS: &str = "id, category, amount, expense_date, notes, created_at";

#[derive(Clone, Default)]
pub struct ExpenseRepository;

impl ExpenseRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_expenses<'e, E>(&self, executor: E) -> Result<Vec<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY created_at DESC");
        let expenses = sqlx::query_as::<_, Expense>(&sql)
            .fetch_all(executor)
            .await?;

        Ok(expenses)
    }

    pub async fn create_expense<'e, E>(&self, executor: E, new: &NewExpense) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO expenses (category, amount, expense_date, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING {EXPENSE_COLUMNS}
            "#
        );
        let expense = sqlx::query_as::<_, Expense>(&sql)
            .bind(new.category.as_str())
            .bind(new.amount)
            .bind(new.expense_date)
            .bind(new.notes.as_deref())
            .fetch_one(executor)
            .await?;

        Ok(expense)
    }

    // `notes` pode ser limpo explicitamente, por isso o par ($5 flag, $6 valor)
    pub async fn update_expense<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &ExpenseChanges,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE expenses
            SET category     = COALESCE($2, category),
                amount       = COALESCE($3, amount),
                expense_date = COALESCE($4, expense_date),
                notes        = CASE WHEN $5 THEN $6 ELSE notes END
            WHERE id = $1
            RETURNING {EXPENSE_COLUMNS}
            "#
        );
        let notes_value = changes.notes.as_ref().and_then(|n| n.as_deref());

        sqlx::query_as::<_, Expense>(&sql)
            .bind(id)
            .bind(changes.category.map(|c| c.as_str()))
            .bind(changes.amount)
            .bind(changes.expense_date)
            .bind(changes.notes.is_some())
            .bind(notes_value)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete_expense<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        ensure_affected(result)
    }
}
