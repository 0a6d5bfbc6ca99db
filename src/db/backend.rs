// src/db/backend.rs

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        appointment::{Appointment, AppointmentChanges, AppointmentProcedure, NewAppointment},
        client::{Client, ClientChanges, NewClient},
        expense::{Expense, ExpenseChanges, NewExpense},
        procedure::{NewProcedure, Procedure, ProcedureChanges},
    },
};

/// Tudo o que a store precisa do backend.
///
/// Existem duas implementações: [`PgBackend`](crate::db::PgBackend), que fala
/// com o Postgres, e [`FixtureBackend`](crate::db::FixtureBackend), usada
/// quando nenhum banco está configurado. A escolha acontece uma única vez na
/// inicialização; as duas devolvem registros com o mesmo formato.
///
/// Regras comuns:
/// - `load_*` devolve a coleção inteira já ordenada (ver cada método).
/// - `update_*` e `delete_*` de um id inexistente devolvem [`AppError::NotFound`].
/// - Referências inválidas (cliente ou procedimento inexistente) devolvem
///   [`AppError::InvalidReference`].
#[async_trait]
pub trait StudioBackend: Send + Sync {
    /// Nome curto para logs ("postgres", "fixture").
    fn name(&self) -> &'static str;

    // ── Clientes ───────────────────────────────────────────────────────

    /// Ordenados por `created_at` decrescente.
    async fn load_clients(&self) -> Result<Vec<Client>, AppError>;
    async fn insert_client(&self, new: &NewClient) -> Result<Client, AppError>;
    async fn update_client(&self, id: Uuid, changes: &ClientChanges) -> Result<Client, AppError>;
    async fn delete_client(&self, id: Uuid) -> Result<(), AppError>;
    async fn client_has_appointments(&self, id: Uuid) -> Result<bool, AppError>;

    // ── Procedimentos ──────────────────────────────────────────────────

    /// Ordenados por `name` crescente.
    async fn load_procedures(&self) -> Result<Vec<Procedure>, AppError>;
    async fn insert_procedure(&self, new: &NewProcedure) -> Result<Procedure, AppError>;
    async fn update_procedure(&self, id: Uuid, changes: &ProcedureChanges) -> Result<Procedure, AppError>;
    async fn delete_procedure(&self, id: Uuid) -> Result<(), AppError>;
    async fn procedure_in_use(&self, id: Uuid) -> Result<bool, AppError>;

    // ── Agendamentos ───────────────────────────────────────────────────

    /// Ordenados por `appointment_date` decrescente, com `client` e
    /// `procedures` resolvidos.
    async fn load_appointments(&self) -> Result<Vec<Appointment>, AppError>;

    /// Cria o agendamento e as linhas de associação numa única operação.
    async fn insert_appointment(
        &self,
        new: &NewAppointment,
        procedure_ids: &[Uuid],
    ) -> Result<Appointment, AppError>;

    /// Com `Some(ids)` o conjunto de procedimentos é substituído por inteiro
    /// (apaga tudo e reinsere), junto com a alteração dos campos.
    /// `None` não toca na associação.
    async fn update_appointment(
        &self,
        id: Uuid,
        changes: &AppointmentChanges,
        procedure_ids: Option<&[Uuid]>,
    ) -> Result<Appointment, AppError>;

    /// Remove o agendamento e as suas linhas de associação.
    async fn delete_appointment(&self, id: Uuid) -> Result<(), AppError>;

    async fn load_appointment_procedures(
        &self,
        appointment_id: Uuid,
    ) -> Result<Vec<AppointmentProcedure>, AppError>;

    // ── Despesas ───────────────────────────────────────────────────────

    /// Ordenadas por `created_at` decrescente.
    async fn load_expenses(&self) -> Result<Vec<Expense>, AppError>;
    async fn insert_expense(&self, new: &NewExpense) -> Result<Expense, AppError>;
    async fn update_expense(&self, id: Uuid, changes: &ExpenseChanges) -> Result<Expense, AppError>;
    async fn delete_expense(&self, id: Uuid) -> Result<(), AppError>;
}

// =========================================================================
//  JOIN NA LEITURA (compartilhado pelos dois backends)
// =========================================================================

/// Preenche `client` e `procedures` de cada agendamento.
///
/// `links` são pares (appointment_id, procedimento). A ordem dos
/// procedimentos dentro de um agendamento segue a ordem de `links`.
pub(crate) fn resolve_appointment_joins(
    appointments: &mut [Appointment],
    clients: &[Client],
    links: Vec<(Uuid, Procedure)>,
) {
    let clients_by_id: HashMap<Uuid, &Client> = clients.iter().map(|c| (c.id, c)).collect();

    let mut procedures_by_appointment: HashMap<Uuid, Vec<Procedure>> = HashMap::new();
    for (appointment_id, procedure) in links {
        procedures_by_appointment.entry(appointment_id).or_default().push(procedure);
    }

    for appointment in appointments.iter_mut() {
        appointment.client = clients_by_id.get(&appointment.client_id).map(|c| (*c).clone());
        appointment.procedures = procedures_by_appointment
            .remove(&appointment.id)
            .unwrap_or_default();
    }
}

// Ordenações fixas de cada coleção
pub(crate) fn sort_clients(clients: &mut [Client]) {
    clients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

pub(crate) fn sort_procedures(procedures: &mut [Procedure]) {
    procedures.sort_by(|a, b| a.name.cmp(&b.name));
}

pub(crate) fn sort_appointments(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| b.appointment_date.cmp(&a.appointment_date));
}

pub(crate) fn sort_expenses(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
