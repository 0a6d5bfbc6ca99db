// src/db/fixture.rs

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::backend::{
        resolve_appointment_joins, sort_appointments, sort_clients, sort_expenses, sort_procedures,
        StudioBackend,
    },
    models::{
        appointment::{
            Appointment, AppointmentChanges, AppointmentProcedure, AppointmentStatus, NewAppointment,
        },
        client::{Client, ClientChanges, NewClient},
        expense::{Expense, ExpenseCategory, ExpenseChanges, NewExpense},
        procedure::{NewProcedure, Procedure, ProcedureChanges},
    },
};

// As "tabelas" guardadas normalizadas, como no banco: o join só acontece na leitura
#[derive(Debug, Default, Clone)]
struct Tables {
    clients: Vec<Client>,
    procedures: Vec<Procedure>,
    appointments: Vec<Appointment>,
    links: Vec<AppointmentProcedure>,
    expenses: Vec<Expense>,
}

impl Tables {
    fn client_exists(&self, id: Uuid) -> bool {
        self.clients.iter().any(|c| c.id == id)
    }

    fn check_procedures(&self, ids: &[Uuid]) -> Result<(), AppError> {
        match ids.iter().find(|id| !self.procedures.iter().any(|p| p.id == **id)) {
            Some(_) => Err(AppError::InvalidReference("procedimento informado".into())),
            None => Ok(()),
        }
    }

    fn replace_links(&mut self, appointment_id: Uuid, procedure_ids: &[Uuid]) {
        self.links.retain(|l| l.appointment_id != appointment_id);
        self.links.extend(procedure_ids.iter().map(|procedure_id| AppointmentProcedure {
            appointment_id,
            procedure_id: *procedure_id,
        }));
    }

    fn joined_appointments(&self) -> Vec<Appointment> {
        let mut appointments = self.appointments.clone();

        let mut procedures = self.procedures.clone();
        sort_procedures(&mut procedures);
        // Mesma ordem do Postgres: procedimentos por nome dentro de cada agendamento
        let mut links = Vec::with_capacity(self.links.len());
        for procedure in &procedures {
            for link in self.links.iter().filter(|l| l.procedure_id == procedure.id) {
                links.push((link.appointment_id, procedure.clone()));
            }
        }

        resolve_appointment_joins(&mut appointments, &self.clients, links);
        sort_appointments(&mut appointments);
        appointments
    }
}

/// Backend em memória usado quando nenhum banco está configurado.
///
/// Aplica as mesmas regras do schema do Postgres (chaves estrangeiras,
/// `NotFound` em id inexistente, substituição atômica da associação), para
/// que a store se comporte igual com qualquer um dos dois.
#[derive(Debug, Default)]
pub struct FixtureBackend {
    tables: RwLock<Tables>,
}

impl FixtureBackend {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Dados de exemplo: duas clientes, dois procedimentos, dois agendamentos
    /// (um amanhã, agendado; outro agora, concluído) e uma despesa de hoje.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let maria = Client {
            id: Uuid::new_v4(),
            full_name: "Maria Silva".into(),
            phone: "(11) 99999-9999".into(),
            created_at: now,
        };
        let ana = Client {
            id: Uuid::new_v4(),
            full_name: "Ana Santos".into(),
            phone: "(11) 88888-8888".into(),
            created_at: now,
        };
        let lashes = Procedure {
            id: Uuid::new_v4(),
            name: "Extensão de Cílios".into(),
            created_at: now,
        };
        let brows = Procedure {
            id: Uuid::new_v4(),
            name: "Design de Sobrancelhas".into(),
            created_at: now,
        };
        let tomorrow = Appointment {
            id: Uuid::new_v4(),
            client_id: maria.id,
            appointment_date: now + Duration::days(1),
            total_value: Decimal::new(150, 0),
            status: AppointmentStatus::Scheduled,
            created_at: now,
            client: None,
            procedures: Vec::new(),
        };
        let today = Appointment {
            id: Uuid::new_v4(),
            client_id: ana.id,
            appointment_date: now,
            total_value: Decimal::new(80, 0),
            status: AppointmentStatus::Completed,
            created_at: now,
            client: None,
            procedures: Vec::new(),
        };
        let supplies = Expense {
            id: Uuid::new_v4(),
            category: ExpenseCategory::WorkSupplies,
            amount: Decimal::new(200, 0),
            expense_date: now.date_naive(),
            notes: Some("Compras de produtos".into()),
            created_at: now,
        };

        let links = vec![
            AppointmentProcedure { appointment_id: tomorrow.id, procedure_id: lashes.id },
            AppointmentProcedure { appointment_id: today.id, procedure_id: brows.id },
        ];

        Self {
            tables: RwLock::new(Tables {
                clients: vec![maria, ana],
                procedures: vec![lashes, brows],
                appointments: vec![tomorrow, today],
                links,
                expenses: vec![supplies],
            }),
        }
    }
}

#[async_trait]
impl StudioBackend for FixtureBackend {
    fn name(&self) -> &'static str {
        "fixture"
    }

    // --- CLIENTES ---

    async fn load_clients(&self) -> Result<Vec<Client>, AppError> {
        let mut clients = self.tables.read().await.clients.clone();
        sort_clients(&mut clients);
        Ok(clients)
    }

    async fn insert_client(&self, new: &NewClient) -> Result<Client, AppError> {
        let client = Client {
            id: Uuid::new_v4(),
            full_name: new.full_name.clone(),
            phone: new.phone.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.clients.push(client.clone());
        Ok(client)
    }

    async fn update_client(&self, id: Uuid, changes: &ClientChanges) -> Result<Client, AppError> {
        let mut tables = self.tables.write().await;
        let client = tables.clients.iter_mut().find(|c| c.id == id).ok_or(AppError::NotFound)?;
        changes.apply_to(client);
        Ok(client.clone())
    }

    async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        // Equivalente ao ON DELETE RESTRICT
        if tables.appointments.iter().any(|a| a.client_id == id) {
            return Err(AppError::ClientHasAppointments);
        }
        let before = tables.clients.len();
        tables.clients.retain(|c| c.id != id);
        if tables.clients.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn client_has_appointments(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.tables.read().await.appointments.iter().any(|a| a.client_id == id))
    }

    // --- PROCEDIMENTOS ---

    async fn load_procedures(&self) -> Result<Vec<Procedure>, AppError> {
        let mut procedures = self.tables.read().await.procedures.clone();
        sort_procedures(&mut procedures);
        Ok(procedures)
    }

    async fn insert_procedure(&self, new: &NewProcedure) -> Result<Procedure, AppError> {
        let procedure = Procedure {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.procedures.push(procedure.clone());
        Ok(procedure)
    }

    async fn update_procedure(&self, id: Uuid, changes: &ProcedureChanges) -> Result<Procedure, AppError> {
        let mut tables = self.tables.write().await;
        let procedure = tables.procedures.iter_mut().find(|p| p.id == id).ok_or(AppError::NotFound)?;
        changes.apply_to(procedure);
        Ok(procedure.clone())
    }

    async fn delete_procedure(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.links.iter().any(|l| l.procedure_id == id) {
            return Err(AppError::ProcedureInUse);
        }
        let before = tables.procedures.len();
        tables.procedures.retain(|p| p.id != id);
        if tables.procedures.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn procedure_in_use(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.tables.read().await.links.iter().any(|l| l.procedure_id == id))
    }

    // --- AGENDAMENTOS ---

    async fn load_appointments(&self) -> Result<Vec<Appointment>, AppError> {
        Ok(self.tables.read().await.joined_appointments())
    }

    async fn insert_appointment(
        &self,
        new: &NewAppointment,
        procedure_ids: &[Uuid],
    ) -> Result<Appointment, AppError> {
        let mut tables = self.tables.write().await;

        // Tudo validado antes de escrever: ou entra tudo, ou nada
        if !tables.client_exists(new.client_id) {
            return Err(AppError::InvalidReference(format!("cliente {}", new.client_id)));
        }
        tables.check_procedures(procedure_ids)?;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            client_id: new.client_id,
            appointment_date: new.appointment_date,
            total_value: new.total_value,
            status: new.status.clone(),
            created_at: Utc::now(),
            client: None,
            procedures: Vec::new(),
        };
        let id = appointment.id;
        tables.appointments.push(appointment);
        tables.replace_links(id, procedure_ids);

        tables
            .joined_appointments()
            .into_iter()
            .find(|a| a.id == id)
            .ok_or(AppError::NotFound)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        changes: &AppointmentChanges,
        procedure_ids: Option<&[Uuid]>,
    ) -> Result<Appointment, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.appointments.iter().any(|a| a.id == id) {
            return Err(AppError::NotFound);
        }
        if let Some(client_id) = changes.client_id {
            if !tables.client_exists(client_id) {
                return Err(AppError::InvalidReference("cliente informado".into()));
            }
        }
        if let Some(ids) = procedure_ids {
            tables.check_procedures(ids)?;
        }

        if let Some(appointment) = tables.appointments.iter_mut().find(|a| a.id == id) {
            changes.apply_to(appointment);
        }
        if let Some(ids) = procedure_ids {
            tables.replace_links(id, ids);
        }

        tables
            .joined_appointments()
            .into_iter()
            .find(|a| a.id == id)
            .ok_or(AppError::NotFound)
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.appointments.len();
        tables.appointments.retain(|a| a.id != id);
        if tables.appointments.len() == before {
            return Err(AppError::NotFound);
        }
        tables.links.retain(|l| l.appointment_id != id);
        Ok(())
    }

    async fn load_appointment_procedures(
        &self,
        appointment_id: Uuid,
    ) -> Result<Vec<AppointmentProcedure>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .links
            .iter()
            .filter(|l| l.appointment_id == appointment_id)
            .cloned()
            .collect())
    }

    // --- DESPESAS ---

    async fn load_expenses(&self) -> Result<Vec<Expense>, AppError> {
        let mut expenses = self.tables.read().await.expenses.clone();
        sort_expenses(&mut expenses);
        Ok(expenses)
    }

    async fn insert_expense(&self, new: &NewExpense) -> Result<Expense, AppError> {
        let expense = Expense {
            id: Uuid::new_v4(),
            category: new.category,
            amount: new.amount,
            expense_date: new.expense_date,
            notes: new.notes.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn update_expense(&self, id: Uuid, changes: &ExpenseChanges) -> Result<Expense, AppError> {
        let mut tables = self.tables.write().await;
        let expense = tables.expenses.iter_mut().find(|e| e.id == id).ok_or(AppError::NotFound)?;
        changes.apply_to(expense);
        Ok(expense.clone())
    }

    async fn delete_expense(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.expenses.len();
        tables.expenses.retain(|e| e.id != id);
        if tables.expenses.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_appointments_come_back_joined() {
        let backend = FixtureBackend::seeded(Utc::now());
        let appointments = backend.load_appointments().await.unwrap();

        assert_eq!(appointments.len(), 2);
        for appointment in &appointments {
            let client = appointment.client.as_ref().expect("client resolved");
            assert_eq!(client.id, appointment.client_id);
            assert_eq!(appointment.procedures.len(), 1);
        }
        // appointment_date decrescente: o de amanhã vem primeiro
        assert!(appointments[0].appointment_date > appointments[1].appointment_date);
        assert_eq!(appointments[0].procedures[0].name, "Extensão de Cílios");
    }

    #[tokio::test]
    async fn insert_with_unknown_procedure_writes_nothing() {
        let backend = FixtureBackend::seeded(Utc::now());
        let client_id = backend.load_clients().await.unwrap()[0].id;
        let new = NewAppointment {
            client_id,
            appointment_date: Utc::now(),
            total_value: Decimal::new(50, 0),
            status: AppointmentStatus::Scheduled,
        };

        let err = backend.insert_appointment(&new, &[Uuid::new_v4()]).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidReference(_)));
        assert_eq!(backend.load_appointments().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn procedures_load_alphabetically() {
        let backend = FixtureBackend::seeded(Utc::now());
        let names: Vec<_> = backend
            .load_procedures()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Design de Sobrancelhas", "Extensão de Cílios"]);
    }
}
