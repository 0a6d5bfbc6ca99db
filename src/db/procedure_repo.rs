// src/db/procedure_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::ensure_affected, error::AppError},
    models::procedure::{NewProcedure, Procedure, ProcedureChanges},
};

#[derive(Clone, Default)]
pub struct ProcedureRepository;

impl ProcedureRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_procedures<'e, E>(&self, executor: E) -> Result<Vec<Procedure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let procedures = sqlx::query_as::<_, Procedure>(
            "SELECT id, name, created_at FROM procedures ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;

        Ok(procedures)
    }

    pub async fn create_procedure<'e, E>(
        &self,
        executor: E,
        new: &NewProcedure,
    ) -> Result<Procedure, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let procedure = sqlx::query_as::<_, Procedure>(
            "INSERT INTO procedures (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(&new.name)
        .fetch_one(executor)
        .await?;

        Ok(procedure)
    }

    pub async fn update_procedure<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &ProcedureChanges,
    ) -> Result<Procedure, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Procedure>(
            r#"
            UPDATE procedures
            SET name = COALESCE($2, name)
            WHERE id = $1
            RETURNING id, name, created_at
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn delete_procedure<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // A FK com RESTRICT ainda protege se alguém criar um vínculo entre
        // a checagem da store e este DELETE
        let result = sqlx::query("DELETE FROM procedures WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::ProcedureInUse;
                    }
                }
                AppError::from(e)
            })?;

        ensure_affected(result)
    }

    /// Alguma linha de appointment_procedures aponta para este procedimento?
    pub async fn is_in_use<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM appointment_procedures WHERE procedure_id = $1)",
        )
        .bind(id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }
}
