// src/db/client_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::ensure_affected, error::AppError},
    models::client::{Client, ClientChanges, NewClient},
};

// Responsável pelas interações com a tabela 'clients'
#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_clients<'e, E>(&self, executor: E) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, full_name, phone, created_at FROM clients ORDER BY created_at DESC",
        )
        .fetch_all(executor)
        .await?;

        Ok(clients)
    }

    pub async fn find_client<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, full_name, phone, created_at FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(client)
    }

    pub async fn create_client<'e, E>(&self, executor: E, new: &NewClient) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (full_name, phone)
            VALUES ($1, $2)
            RETURNING id, full_name, phone, created_at
            "#,
        )
        .bind(&new.full_name)
        .bind(&new.phone)
        .fetch_one(executor)
        .await?;

        Ok(client)
    }

    // COALESCE mantém o valor atual quando o campo não veio
    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &ClientChanges,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET full_name = COALESCE($2, full_name),
                phone     = COALESCE($3, phone)
            WHERE id = $1
            RETURNING id, full_name, phone, created_at
            "#,
        )
        .bind(id)
        .bind(changes.full_name.as_deref())
        .bind(changes.phone.as_deref())
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn delete_client<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // A FK com RESTRICT ainda protege se alguém criar um vínculo entre
        // a checagem da store e este DELETE
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::ClientHasAppointments;
                    }
                }
                AppError::from(e)
            })?;

        ensure_affected(result)
    }

    /// Existe pelo menos um agendamento apontando para esta cliente?
    pub async fn has_appointments<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM appointments WHERE client_id = $1)",
        )
        .bind(id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }
}
