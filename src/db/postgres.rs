// src/db/postgres.rs

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        backend::{resolve_appointment_joins, StudioBackend},
        AppointmentRepository, ClientRepository, ExpenseRepository, ProcedureRepository,
    },
    models::{
        appointment::{Appointment, AppointmentChanges, AppointmentProcedure, NewAppointment},
        client::{Client, ClientChanges, NewClient},
        expense::{Expense, ExpenseChanges, NewExpense},
        procedure::{NewProcedure, Procedure, ProcedureChanges},
    },
};

// Backend real: cada chamada vira uma ou mais queries no Postgres
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
    clients: ClientRepository,
    procedures: ProcedureRepository,
    appointments: AppointmentRepository,
    expenses: ExpenseRepository,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            clients: ClientRepository::new(),
            procedures: ProcedureRepository::new(),
            appointments: AppointmentRepository::new(),
            expenses: ExpenseRepository::new(),
        }
    }

    // Resolve cliente e procedimentos de um agendamento recém-escrito,
    // ainda dentro da transação que o escreveu
    async fn join_appointment(
        &self,
        conn: &mut PgConnection,
        mut appointment: Appointment,
    ) -> Result<Appointment, AppError> {
        let client = self.clients.find_client(&mut *conn, appointment.client_id).await?;
        let links = self
            .appointments
            .list_linked_procedures_for(&mut *conn, appointment.id)
            .await?;

        let links = links.into_iter().map(|l| (l.appointment_id, l.procedure)).collect();
        resolve_appointment_joins(
            std::slice::from_mut(&mut appointment),
            client.as_slice(),
            links,
        );

        Ok(appointment)
    }
}

#[async_trait]
impl StudioBackend for PgBackend {
    fn name(&self) -> &'static str {
        "postgres"
    }

    // --- CLIENTES ---

    async fn load_clients(&self) -> Result<Vec<Client>, AppError> {
        self.clients.list_clients(&self.pool).await
    }

    async fn insert_client(&self, new: &NewClient) -> Result<Client, AppError> {
        self.clients.create_client(&self.pool, new).await
    }

    async fn update_client(&self, id: Uuid, changes: &ClientChanges) -> Result<Client, AppError> {
        self.clients.update_client(&self.pool, id, changes).await
    }

    async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        self.clients.delete_client(&self.pool, id).await
    }

    async fn client_has_appointments(&self, id: Uuid) -> Result<bool, AppError> {
        self.clients.has_appointments(&self.pool, id).await
    }

    // --- PROCEDIMENTOS ---

    async fn load_procedures(&self) -> Result<Vec<Procedure>, AppError> {
        self.procedures.list_procedures(&self.pool).await
    }

    async fn insert_procedure(&self, new: &NewProcedure) -> Result<Procedure, AppError> {
        self.procedures.create_procedure(&self.pool, new).await
    }

    async fn update_procedure(&self, id: Uuid, changes: &ProcedureChanges) -> Result<Procedure, AppError> {
        self.procedures.update_procedure(&self.pool, id, changes).await
    }

    async fn delete_procedure(&self, id: Uuid) -> Result<(), AppError> {
        self.procedures.delete_procedure(&self.pool, id).await
    }

    async fn procedure_in_use(&self, id: Uuid) -> Result<bool, AppError> {
        self.procedures.is_in_use(&self.pool, id).await
    }

    // --- AGENDAMENTOS ---

    async fn load_appointments(&self) -> Result<Vec<Appointment>, AppError> {
        // Snapshot consistente das três tabelas envolvidas no join
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut appointments = self.appointments.list_appointments(&mut *tx).await?;
        let clients = self.clients.list_clients(&mut *tx).await?;
        let links = self.appointments.list_linked_procedures(&mut *tx).await?;

        tx.commit().await?;

        let links = links.into_iter().map(|l| (l.appointment_id, l.procedure)).collect();
        resolve_appointment_joins(&mut appointments, &clients, links);

        Ok(appointments)
    }

    async fn insert_appointment(
        &self,
        new: &NewAppointment,
        procedure_ids: &[Uuid],
    ) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await?;

        let appointment = self.appointments.create_appointment(&mut *tx, new).await?;
        self.appointments.insert_links(&mut *tx, appointment.id, procedure_ids).await?;
        let appointment = self.join_appointment(&mut tx, appointment).await?;

        tx.commit().await?;
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        changes: &AppointmentChanges,
        procedure_ids: Option<&[Uuid]>,
    ) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await?;

        let appointment = self.appointments.update_appointment(&mut *tx, id, changes).await?;

        // Substituição completa: apaga tudo e reinsere o novo conjunto
        if let Some(ids) = procedure_ids {
            self.appointments.delete_links(&mut *tx, id).await?;
            self.appointments.insert_links(&mut *tx, id, ids).await?;
        }
        let appointment = self.join_appointment(&mut tx, appointment).await?;

        tx.commit().await?;
        Ok(appointment)
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.appointments.delete_links(&mut *tx, id).await?;
        self.appointments.delete_appointment(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn load_appointment_procedures(
        &self,
        appointment_id: Uuid,
    ) -> Result<Vec<AppointmentProcedure>, AppError> {
        self.appointments.list_links_for(&self.pool, appointment_id).await
    }

    // --- DESPESAS ---

    async fn load_expenses(&self) -> Result<Vec<Expense>, AppError> {
        self.expenses.list_expenses(&self.pool).await
    }

    async fn insert_expense(&self, new: &NewExpense) -> Result<Expense, AppError> {
        self.expenses.create_expense(&self.pool, new).await
    }

    async fn update_expense(&self, id: Uuid, changes: &ExpenseChanges) -> Result<Expense, AppError> {
        self.expenses.update_expense(&self.pool, id, changes).await
    }

    async fn delete_expense(&self, id: Uuid) -> Result<(), AppError> {
        self.expenses.delete_expense(&self.pool, id).await
    }
}
