// src/services/store.rs

use std::{fmt, sync::Arc};

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::StudioBackend,
    models::{
        appointment::{Appointment, AppointmentChanges, AppointmentProcedure, NewAppointment},
        client::{Client, ClientChanges, NewClient},
        expense::{Expense, ExpenseChanges, NewExpense},
        procedure::{NewProcedure, Procedure, ProcedureChanges},
    },
};

// =========================================================================
//  ESTADO DAS COLEÇÕES
// =========================================================================

/// Estado de cada coleção, independente das outras.
///
/// `Error` significa "estado desconhecido": a coleção fica vazia, mas isso
/// não quer dizer que não existam registros.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum CollectionStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Clients,
    Procedures,
    Appointments,
    Expenses,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Clients => "clientes",
            Self::Procedures => "procedimentos",
            Self::Appointments => "agendamentos",
            Self::Expenses => "despesas",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatuses {
    pub clients: CollectionStatus,
    pub procedures: CollectionStatus,
    pub appointments: CollectionStatus,
    pub expenses: CollectionStatus,
}

/// Cópia das quatro coleções, entrada das views de agregação.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub clients: Vec<Client>,
    pub procedures: Vec<Procedure>,
    pub appointments: Vec<Appointment>,
    pub expenses: Vec<Expense>,
}

// Todo registro tem um id
pub trait Record {
    fn id(&self) -> Uuid;
}

impl Record for Client {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Procedure {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Appointment {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug)]
struct Collection<T> {
    items: Vec<T>,
    status: CollectionStatus,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new(), status: CollectionStatus::Idle }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    clients: Collection<Client>,
    procedures: Collection<Procedure>,
    appointments: Collection<Appointment>,
    expenses: Collection<Expense>,
}

// Seletores usados pelos helpers genéricos
type Slot<T> = for<'a> fn(&'a mut StoreState) -> &'a mut Collection<T>;

impl StoreState {
    fn clients(&mut self) -> &mut Collection<Client> {
        &mut self.clients
    }

    fn procedures(&mut self) -> &mut Collection<Procedure> {
        &mut self.procedures
    }

    fn appointments(&mut self) -> &mut Collection<Appointment> {
        &mut self.appointments
    }

    fn expenses(&mut self) -> &mut Collection<Expense> {
        &mut self.expenses
    }
}

// Remove ids repetidos mantendo a ordem de chegada
fn distinct_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

// =========================================================================
//  A STORE
// =========================================================================

/// Cache em memória das quatro coleções, sincronizado com o backend.
///
/// - `fetch_*` nunca falha: em erro loga, esvazia a coleção e marca `Error`.
/// - `add_*`, `update_*` e `delete_*` propagam o erro e, quando falham,
///   não mexem no cache.
/// - Nenhum lock é mantido durante uma chamada ao backend. Se dois fetches
///   da mesma coleção se sobrepõem, vale a resposta que chegar por último.
pub struct StudioStore {
    backend: Arc<dyn StudioBackend>,
    state: RwLock<StoreState>,
}

impl StudioStore {
    pub fn new(backend: Arc<dyn StudioBackend>) -> Self {
        Self { backend, state: RwLock::new(StoreState::default()) }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    // --- Leitura do cache ---

    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().await;
        StoreSnapshot {
            clients: state.clients.items.clone(),
            procedures: state.procedures.items.clone(),
            appointments: state.appointments.items.clone(),
            expenses: state.expenses.items.clone(),
        }
    }

    pub async fn clients(&self) -> Vec<Client> {
        self.state.read().await.clients.items.clone()
    }

    pub async fn procedures(&self) -> Vec<Procedure> {
        self.state.read().await.procedures.items.clone()
    }

    pub async fn appointments(&self) -> Vec<Appointment> {
        self.state.read().await.appointments.items.clone()
    }

    pub async fn expenses(&self) -> Vec<Expense> {
        self.state.read().await.expenses.items.clone()
    }

    pub async fn status(&self, kind: CollectionKind) -> CollectionStatus {
        let state = self.state.read().await;
        match kind {
            CollectionKind::Clients => state.clients.status.clone(),
            CollectionKind::Procedures => state.procedures.status.clone(),
            CollectionKind::Appointments => state.appointments.status.clone(),
            CollectionKind::Expenses => state.expenses.status.clone(),
        }
    }

    pub async fn statuses(&self) -> StoreStatuses {
        let state = self.state.read().await;
        StoreStatuses {
            clients: state.clients.status.clone(),
            procedures: state.procedures.status.clone(),
            appointments: state.appointments.status.clone(),
            expenses: state.expenses.status.clone(),
        }
    }

    // --- Helpers genéricos ---

    async fn begin_fetch<T: Send + Sync>(&self, slot: Slot<T>) {
        let mut state = self.state.write().await;
        slot(&mut *state).status = CollectionStatus::Loading;
    }

    async fn finish_fetch<T: Send + Sync>(
        &self,
        kind: CollectionKind,
        slot: Slot<T>,
        result: Result<Vec<T>, AppError>,
    ) {
        let mut state = self.state.write().await;
        let collection = slot(&mut *state);
        match result {
            Ok(items) => {
                tracing::debug!("{} {} carregados", items.len(), kind);
                collection.items = items;
                collection.status = CollectionStatus::Ready;
            }
            Err(e) => {
                tracing::error!("Erro ao buscar {}: {}", kind, e);
                collection.items.clear();
                collection.status = CollectionStatus::Error(e.to_string());
            }
        }
    }

    async fn push_front<T: Send + Sync>(&self, slot: Slot<T>, record: T) {
        let mut state = self.state.write().await;
        slot(&mut *state).items.insert(0, record);
    }

    async fn replace_cached<T: Record + Send + Sync>(&self, slot: Slot<T>, record: T) {
        let mut state = self.state.write().await;
        if let Some(cached) = slot(&mut *state).items.iter_mut().find(|r| r.id() == record.id()) {
            *cached = record;
        }
    }

    async fn remove_cached<T: Record + Send + Sync>(&self, slot: Slot<T>, id: Uuid) {
        let mut state = self.state.write().await;
        slot(&mut *state).items.retain(|r| r.id() != id);
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn fetch_clients(&self) {
        self.begin_fetch(StoreState::clients).await;
        let result = self.backend.load_clients().await;
        self.finish_fetch(CollectionKind::Clients, StoreState::clients, result).await;
    }

    pub async fn add_client(&self, new: NewClient) -> Result<Client, AppError> {
        let client = self
            .backend
            .insert_client(&new)
            .await
            .inspect_err(|e| tracing::error!("Erro ao adicionar cliente: {}", e))?;

        self.push_front(StoreState::clients, client.clone()).await;
        Ok(client)
    }

    pub async fn update_client(&self, id: Uuid, changes: ClientChanges) -> Result<Client, AppError> {
        let client = self
            .backend
            .update_client(id, &changes)
            .await
            .inspect_err(|e| tracing::error!("Erro ao atualizar cliente {}: {}", id, e))?;

        self.replace_cached(StoreState::clients, client.clone()).await;
        Ok(client)
    }

    /// Falha com `ClientHasAppointments` se houver qualquer agendamento dela.
    pub async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        if self.backend.client_has_appointments(id).await? {
            tracing::warn!("Exclusão recusada: cliente {} possui agendamentos", id);
            return Err(AppError::ClientHasAppointments);
        }

        self.backend
            .delete_client(id)
            .await
            .inspect_err(|e| tracing::error!("Erro ao deletar cliente {}: {}", id, e))?;

        self.remove_cached(StoreState::clients, id).await;
        Ok(())
    }

    // =========================================================================
    //  PROCEDIMENTOS
    // =========================================================================

    pub async fn fetch_procedures(&self) {
        self.begin_fetch(StoreState::procedures).await;
        let result = self.backend.load_procedures().await;
        self.finish_fetch(CollectionKind::Procedures, StoreState::procedures, result).await;
    }

    pub async fn add_procedure(&self, new: NewProcedure) -> Result<Procedure, AppError> {
        let procedure = self
            .backend
            .insert_procedure(&new)
            .await
            .inspect_err(|e| tracing::error!("Erro ao adicionar procedimento: {}", e))?;

        self.push_front(StoreState::procedures, procedure.clone()).await;
        Ok(procedure)
    }

    pub async fn update_procedure(
        &self,
        id: Uuid,
        changes: ProcedureChanges,
    ) -> Result<Procedure, AppError> {
        let procedure = self
            .backend
            .update_procedure(id, &changes)
            .await
            .inspect_err(|e| tracing::error!("Erro ao atualizar procedimento {}: {}", id, e))?;

        self.replace_cached(StoreState::procedures, procedure.clone()).await;
        Ok(procedure)
    }

    /// Falha com `ProcedureInUse` se algum agendamento usa o procedimento.
    pub async fn delete_procedure(&self, id: Uuid) -> Result<(), AppError> {
        if self.backend.procedure_in_use(id).await? {
            tracing::warn!("Exclusão recusada: procedimento {} está em uso", id);
            return Err(AppError::ProcedureInUse);
        }

        self.backend
            .delete_procedure(id)
            .await
            .inspect_err(|e| tracing::error!("Erro ao deletar procedimento {}: {}", id, e))?;

        self.remove_cached(StoreState::procedures, id).await;
        Ok(())
    }

    // =========================================================================
    //  AGENDAMENTOS
    // =========================================================================

    pub async fn fetch_appointments(&self) {
        self.begin_fetch(StoreState::appointments).await;
        let result = self.backend.load_appointments().await;
        self.finish_fetch(CollectionKind::Appointments, StoreState::appointments, result).await;
    }

    /// Cria o agendamento com os seus procedimentos e recarrega a coleção
    /// inteira, em vez de remendar o cache.
    pub async fn add_appointment(
        &self,
        new: NewAppointment,
        procedure_ids: Vec<Uuid>,
    ) -> Result<Appointment, AppError> {
        let procedure_ids = distinct_ids(procedure_ids);
        let created = self
            .backend
            .insert_appointment(&new, &procedure_ids)
            .await
            .inspect_err(|e| tracing::error!("Erro ao adicionar agendamento: {}", e))?;

        self.fetch_appointments().await;
        Ok(self.cached_appointment(created.id).await.unwrap_or(created))
    }

    /// `procedure_ids = Some(..)` substitui todo o conjunto de procedimentos.
    pub async fn update_appointment(
        &self,
        id: Uuid,
        changes: AppointmentChanges,
        procedure_ids: Option<Vec<Uuid>>,
    ) -> Result<Appointment, AppError> {
        let procedure_ids = procedure_ids.map(distinct_ids);
        let updated = self
            .backend
            .update_appointment(id, &changes, procedure_ids.as_deref())
            .await
            .inspect_err(|e| tracing::error!("Erro ao atualizar agendamento {}: {}", id, e))?;

        self.fetch_appointments().await;
        Ok(self.cached_appointment(id).await.unwrap_or(updated))
    }

    pub async fn delete_appointment(&self, id: Uuid) -> Result<(), AppError> {
        self.backend
            .delete_appointment(id)
            .await
            .inspect_err(|e| tracing::error!("Erro ao cancelar agendamento {}: {}", id, e))?;

        self.remove_cached(StoreState::appointments, id).await;
        Ok(())
    }

    async fn cached_appointment(&self, id: Uuid) -> Option<Appointment> {
        self.state
            .read()
            .await
            .appointments
            .items
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    // =========================================================================
    //  DESPESAS
    // =========================================================================

    pub async fn fetch_expenses(&self) {
        self.begin_fetch(StoreState::expenses).await;
        let result = self.backend.load_expenses().await;
        self.finish_fetch(CollectionKind::Expenses, StoreState::expenses, result).await;
    }

    pub async fn add_expense(&self, new: NewExpense) -> Result<Expense, AppError> {
        let expense = self
            .backend
            .insert_expense(&new)
            .await
            .inspect_err(|e| tracing::error!("Erro ao adicionar despesa: {}", e))?;

        self.push_front(StoreState::expenses, expense.clone()).await;
        Ok(expense)
    }

    pub async fn update_expense(&self, id: Uuid, changes: ExpenseChanges) -> Result<Expense, AppError> {
        let expense = self
            .backend
            .update_expense(id, &changes)
            .await
            .inspect_err(|e| tracing::error!("Erro ao atualizar despesa {}: {}", id, e))?;

        self.replace_cached(StoreState::expenses, expense.clone()).await;
        Ok(expense)
    }

    pub async fn delete_expense(&self, id: Uuid) -> Result<(), AppError> {
        self.backend
            .delete_expense(id)
            .await
            .inspect_err(|e| tracing::error!("Erro ao deletar despesa {}: {}", id, e))?;

        self.remove_cached(StoreState::expenses, id).await;
        Ok(())
    }

    /// Linhas da associação de um agendamento, direto do backend.
    pub async fn appointment_procedure_links(
        &self,
        appointment_id: Uuid,
    ) -> Result<Vec<AppointmentProcedure>, AppError> {
        self.backend.load_appointment_procedures(appointment_id).await
    }
}
