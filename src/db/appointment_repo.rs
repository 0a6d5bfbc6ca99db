// src/db/appointment_repo.rs

use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{ensure_affected, map_reference_error},
        error::AppError,
    },
    models::{
        appointment::{Appointment, AppointmentChanges, AppointmentProcedure, NewAppointment},
        procedure::Procedure,
    },
};

const APPOINTMENT_COLUMNS: &str = "id, client_id, appointment_date, total_value, status, created_at";

// Procedimento já com o id do agendamento ao qual está associado
#[derive(Debug, FromRow)]
pub struct LinkedProcedure {
    pub appointment_id: Uuid,
    #[sqlx(flatten)]
    pub procedure: Procedure,
}

#[derive(Clone, Default)]
pub struct AppointmentRepository;

impl AppointmentRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  AGENDAMENTOS
    // =========================================================================

    /// Só as linhas de `appointments`; o join é feito por quem chama.
    pub async fn list_appointments<'e, E>(&self, executor: E) -> Result<Vec<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY appointment_date DESC"
        );
        let appointments = sqlx::query_as::<_, Appointment>(&sql)
            .fetch_all(executor)
            .await?;

        Ok(appointments)
    }

    pub async fn create_appointment<'e, E>(
        &self,
        executor: E,
        new: &NewAppointment,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO appointments (client_id, appointment_date, total_value, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        );
        let appointment = sqlx::query_as::<_, Appointment>(&sql)
            .bind(new.client_id)
            .bind(new.appointment_date)
            .bind(new.total_value)
            .bind(new.status.as_str())
            .fetch_one(executor)
            .await
            .map_err(|e| map_reference_error(e, &format!("cliente {}", new.client_id)))?;

        Ok(appointment)
    }

    pub async fn update_appointment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &AppointmentChanges,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE appointments
            SET client_id        = COALESCE($2, client_id),
                appointment_date = COALESCE($3, appointment_date),
                total_value      = COALESCE($4, total_value),
                status           = COALESCE($5, status)
            WHERE id = $1
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Appointment>(&sql)
            .bind(id)
            .bind(changes.client_id)
            .bind(changes.appointment_date)
            .bind(changes.total_value)
            .bind(changes.status.as_ref().map(|s| s.as_str()))
            .fetch_optional(executor)
            .await
            .map_err(|e| map_reference_error(e, "cliente informado"))?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete_appointment<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        ensure_affected(result)
    }

    // =========================================================================
    //  ASSOCIAÇÃO appointment_procedures
    // =========================================================================

    pub async fn list_linked_procedures<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<LinkedProcedure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let links = sqlx::query_as::<_, LinkedProcedure>(
            r#"
            SELECT ap.appointment_id, p.id, p.name, p.created_at
            FROM appointment_procedures ap
            JOIN procedures p ON p.id = ap.procedure_id
            ORDER BY p.name ASC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(links)
    }

    pub async fn list_linked_procedures_for<'e, E>(
        &self,
        executor: E,
        appointment_id: Uuid,
    ) -> Result<Vec<LinkedProcedure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let links = sqlx::query_as::<_, LinkedProcedure>(
            r#"
            SELECT ap.appointment_id, p.id, p.name, p.created_at
            FROM appointment_procedures ap
            JOIN procedures p ON p.id = ap.procedure_id
            WHERE ap.appointment_id = $1
            ORDER BY p.name ASC
            "#,
        )
        .bind(appointment_id)
        .fetch_all(executor)
        .await?;

        Ok(links)
    }

    pub async fn list_links_for<'e, E>(
        &self,
        executor: E,
        appointment_id: Uuid,
    ) -> Result<Vec<AppointmentProcedure>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let links = sqlx::query_as::<_, AppointmentProcedure>(
            r#"
            SELECT appointment_id, procedure_id
            FROM appointment_procedures
            WHERE appointment_id = $1
            "#,
        )
        .bind(appointment_id)
        .fetch_all(executor)
        .await?;

        Ok(links)
    }

    pub async fn insert_links<'e, E>(
        &self,
        executor: E,
        appointment_id: Uuid,
        procedure_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if procedure_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO appointment_procedures (appointment_id, procedure_id)
            SELECT $1, UNNEST($2::uuid[])
            "#,
        )
        .bind(appointment_id)
        .bind(procedure_ids)
        .execute(executor)
        .await
        .map_err(|e| map_reference_error(e, "procedimento informado"))?;

        Ok(())
    }

    pub async fn delete_links<'e, E>(&self, executor: E, appointment_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM appointment_procedures WHERE appointment_id = $1")
            .bind(appointment_id)
            .execute(executor)
            .await?;

        Ok(())
    }
}
