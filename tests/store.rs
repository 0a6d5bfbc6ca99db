use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use studio_ledger::{
    common::error::AppError,
    db::{FixtureBackend, StudioBackend},
    models::{
        appointment::{
            Appointment, AppointmentChanges, AppointmentProcedure, AppointmentStatus, NewAppointment,
        },
        client::{Client, ClientChanges, NewClient},
        expense::{Expense, ExpenseCategory, ExpenseChanges, NewExpense},
        procedure::{NewProcedure, Procedure, ProcedureChanges},
    },
    services::store::{CollectionKind, CollectionStatus, StudioStore},
};

// ── Backend que falha sob comando ──────────────────────────────────────────

#[derive(Default)]
struct FlakyBackend {
    inner: FixtureBackend,
    fail_loads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyBackend {
    fn load_guard(&self) -> Result<(), AppError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow::anyhow!("conexão recusada")));
        }
        Ok(())
    }

    fn write_guard(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow::anyhow!("timeout")));
        }
        Ok(())
    }
}

#[async_trait]
impl StudioBackend for FlakyBackend {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn load_clients(&self) -> Result<Vec<Client>, AppError> {
        self.load_guard()?;
        self.inner.load_clients().await
    }
    async fn insert_client(&self, new: &NewClient) -> Result<Client, AppError> {
        self.write_guard()?;
        self.inner.insert_client(new).await
    }
    async fn update_client(&self, id: Uuid, changes: &ClientChanges) -> Result<Client, AppError> {
        self.write_guard()?;
        self.inner.update_client(id, changes).await
    }
    async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        self.write_guard()?;
        self.inner.delete_client(id).await
    }
    async fn client_has_appointments(&self, id: Uuid) -> Result<bool, AppError> {
        self.inner.client_has_appointments(id).await
    }

    async fn load_procedures(&self) -> Result<Vec<Procedure>, AppError> {
        self.load_guard()?;
        self.inner.load_procedures().await
    }
    async fn insert_procedure(&self, new: &NewProcedure) -> Result<Procedure, AppError> {
        self.write_guard()?;
        self.inner.insert_procedure(new).await
    }
    async fn update_procedure(&self, id: Uuid, changes: &ProcedureChanges) -> Result<Procedure, AppError> {
        self.write_guard()?;
        self.inner.update_procedure(id, changes).await
    }
    async fn delete_procedure(&self, id: Uuid) -> Result<(), AppError> {
        self.write_guard()?;
        self.inner.delete_procedure(id).await
    }
    async fn procedure_in_use(&self, id: Uuid) -> Result<bool, AppError> {
        self.inner.procedure_in_use(id).await
    }

    async fn load_appointments(&self) -> Result<Vec<Appointment>, AppError> {
        self.load_guard()?;
        self.inner.load_appointments().await
    }
    async fn insert_appointment(
        &self,
        new: &NewAppointment,
        procedure_ids: &[Uuid],
    ) -> Result<Appointment, AppError> {
        self.write_guard()?;
        self.inner.insert_appointment(new, procedure_ids).await
    }
    async fn update_appointment(
        &self,
        id: Uuid,
        changes: &AppointmentChanges,
        procedure_ids: Option<&[Uuid]>,
    ) -> Result<Appointment, AppError> {
        self.write_guard()?;
        self.inner.update_appointment(id, changes, procedure_ids).await
    }
    async fn delete_appointment(&self, id: Uuid) -> Result<(), AppError> {
        self.write_guard()?;
        self.inner.delete_appointment(id).await
    }
    async fn load_appointment_procedures(
        &self,
        appointment_id: Uuid,
    ) -> Result<Vec<AppointmentProcedure>, AppError> {
        self.inner.load_appointment_procedures(appointment_id).await
    }

    async fn load_expenses(&self) -> Result<Vec<Expense>, AppError> {
        self.load_guard()?;
        self.inner.load_expenses().await
    }
    async fn insert_expense(&self, new: &NewExpense) -> Result<Expense, AppError> {
        self.write_guard()?;
        self.inner.insert_expense(new).await
    }
    async fn update_expense(&self, id: Uuid, changes: &ExpenseChanges) -> Result<Expense, AppError> {
        self.write_guard()?;
        self.inner.update_expense(id, changes).await
    }
    async fn delete_expense(&self, id: Uuid) -> Result<(), AppError> {
        self.write_guard()?;
        self.inner.delete_expense(id).await
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn empty_store() -> StudioStore {
    StudioStore::new(Arc::new(FixtureBackend::empty()))
}

fn new_client(name: &str) -> NewClient {
    NewClient { full_name: name.into(), phone: "11987654321".into() }
}

fn new_appointment(client_id: Uuid) -> NewAppointment {
    NewAppointment {
        client_id,
        appointment_date: Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap(),
        total_value: Decimal::new(150, 0),
        status: AppointmentStatus::Scheduled,
    }
}

async fn procedure(store: &StudioStore, name: &str) -> Procedure {
    store.add_procedure(NewProcedure { name: name.into() }).await.unwrap()
}

// ── Record Store ───────────────────────────────────────────────────────────

#[tokio::test]
async fn add_returns_fields_plus_generated_id() {
    let store = empty_store();

    let client = store.add_client(new_client("Maria Silva")).await.unwrap();
    assert_eq!(client.full_name, "Maria Silva");
    assert_eq!(client.phone, "11987654321");
    assert!(!client.id.is_nil());

    // entra no início do cache sem precisar de fetch
    assert_eq!(store.clients().await, vec![client.clone()]);

    store.fetch_clients().await;
    assert!(store.clients().await.iter().any(|c| c.id == client.id));
}

#[tokio::test]
async fn fetch_marks_each_collection_independently() {
    let store = empty_store();
    assert_eq!(store.status(CollectionKind::Clients).await, CollectionStatus::Idle);

    store.fetch_clients().await;

    let statuses = store.statuses().await;
    assert_eq!(statuses.clients, CollectionStatus::Ready);
    assert_eq!(statuses.procedures, CollectionStatus::Idle);
    assert_eq!(statuses.appointments, CollectionStatus::Idle);
    assert_eq!(statuses.expenses, CollectionStatus::Idle);
}

#[tokio::test]
async fn deleting_client_with_appointments_changes_nothing() {
    let store = empty_store();
    let client = store.add_client(new_client("Ana")).await.unwrap();
    let lashes = procedure(&store, "Extensão de Cílios").await;
    store.add_appointment(new_appointment(client.id), vec![lashes.id]).await.unwrap();

    let before = store.snapshot().await;
    let err = store.delete_client(client.id).await.unwrap_err();
    assert!(matches!(err, AppError::ClientHasAppointments));
    assert!(err.is_integrity());

    let after = store.snapshot().await;
    assert_eq!(before.clients, after.clients);
    assert_eq!(before.appointments, after.appointments);

    store.fetch_clients().await;
    assert_eq!(store.clients().await.len(), 1);
}

#[tokio::test]
async fn deleting_procedure_in_use_changes_nothing() {
    let store = empty_store();
    let client = store.add_client(new_client("Ana")).await.unwrap();
    let brows = procedure(&store, "Design de Sobrancelhas").await;
    store.add_appointment(new_appointment(client.id), vec![brows.id]).await.unwrap();

    let err = store.delete_procedure(brows.id).await.unwrap_err();
    assert!(matches!(err, AppError::ProcedureInUse));

    store.fetch_procedures().await;
    assert_eq!(store.procedures().await, vec![brows]);
}

#[tokio::test]
async fn freed_procedure_can_be_deleted() {
    let store = empty_store();
    let client = store.add_client(new_client("Ana")).await.unwrap();
    let brows = procedure(&store, "Design de Sobrancelhas").await;
    let appointment = store.add_appointment(new_appointment(client.id), vec![brows.id]).await.unwrap();

    store.delete_appointment(appointment.id).await.unwrap();
    assert!(store.appointment_procedure_links(appointment.id).await.unwrap().is_empty());

    store.delete_procedure(brows.id).await.unwrap();
    assert!(store.procedures().await.is_empty());
}

#[tokio::test]
async fn updating_unknown_id_is_not_found_and_leaves_cache_alone() {
    let store = empty_store();
    store.add_client(new_client("Maria")).await.unwrap();
    let before = store.clients().await;

    let changes = ClientChanges { full_name: Some("Outra".into()), phone: None };
    let err = store.update_client(Uuid::new_v4(), changes).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    assert_eq!(store.clients().await, before);

    let err = store.delete_expense(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn update_replaces_cached_record_in_place() {
    let store = empty_store();
    let first = store.add_client(new_client("Maria")).await.unwrap();
    let second = store.add_client(new_client("Ana")).await.unwrap();

    let changes = ClientChanges { full_name: None, phone: Some("1133334444".into()) };
    let updated = store.update_client(first.id, changes).await.unwrap();
    assert_eq!(updated.full_name, "Maria");
    assert_eq!(updated.phone, "1133334444");

    let cached = store.clients().await;
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0].id, second.id);
    assert_eq!(cached[1], updated);
}

#[tokio::test]
async fn procedure_set_is_fully_replaced() {
    let store = empty_store();
    let client = store.add_client(new_client("Maria")).await.unwrap();
    let p1 = procedure(&store, "Cílios").await;
    let p2 = procedure(&store, "Sobrancelhas").await;
    let p3 = procedure(&store, "Lash Lifting").await;

    let appointment = store
        .add_appointment(new_appointment(client.id), vec![p1.id, p3.id])
        .await
        .unwrap();
    assert_eq!(appointment.procedures.len(), 2);
    assert_eq!(appointment.client.as_ref().map(|c| c.id), Some(client.id));

    let updated = store
        .update_appointment(appointment.id, AppointmentChanges::default(), Some(vec![p2.id]))
        .await
        .unwrap();
    assert_eq!(updated.procedures, vec![p2.clone()]);

    let links = store.appointment_procedure_links(appointment.id).await.unwrap();
    assert_eq!(links, vec![AppointmentProcedure { appointment_id: appointment.id, procedure_id: p2.id }]);

    // None mantém o conjunto
    let changes = AppointmentChanges { status: Some(AppointmentStatus::Completed), ..Default::default() };
    let updated = store.update_appointment(appointment.id, changes, None).await.unwrap();
    assert!(updated.is_completed());
    assert_eq!(updated.procedures, vec![p2]);
}

#[tokio::test]
async fn repeated_procedure_ids_are_linked_once() {
    let store = empty_store();
    let client = store.add_client(new_client("Maria")).await.unwrap();
    let p1 = procedure(&store, "Cílios").await;

    let appointment = store
        .add_appointment(new_appointment(client.id), vec![p1.id, p1.id])
        .await
        .unwrap();

    assert_eq!(store.appointment_procedure_links(appointment.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn appointment_with_unknown_procedure_writes_nothing() {
    let store = empty_store();
    let client = store.add_client(new_client("Maria")).await.unwrap();

    let err = store
        .add_appointment(new_appointment(client.id), vec![Uuid::new_v4()])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidReference(_)));

    store.fetch_appointments().await;
    assert!(store.appointments().await.is_empty());
}

#[tokio::test]
async fn unknown_status_survives_round_trip() {
    let store = empty_store();
    let client = store.add_client(new_client("Maria")).await.unwrap();
    let p1 = procedure(&store, "Cílios").await;

    let mut new = new_appointment(client.id);
    new.status = AppointmentStatus::from("remarcado");
    let created = store.add_appointment(new, vec![p1.id]).await.unwrap();

    assert_eq!(created.status.as_str(), "remarcado");
    assert!(!created.is_completed() && !created.is_scheduled());
}

#[tokio::test]
async fn expense_notes_can_be_cleared() {
    let store = empty_store();
    let expense = store
        .add_expense(NewExpense {
            category: ExpenseCategory::Rent,
            amount: Decimal::new(1200, 0),
            expense_date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            notes: Some("março".into()),
        })
        .await
        .unwrap();

    let keep = ExpenseChanges { amount: Some(Decimal::new(1300, 0)), ..Default::default() };
    let updated = store.update_expense(expense.id, keep).await.unwrap();
    assert_eq!(updated.notes.as_deref(), Some("março"));

    let clear = ExpenseChanges { notes: Some(None), ..Default::default() };
    let updated = store.update_expense(expense.id, clear).await.unwrap();
    assert_eq!(updated.notes, None);
    assert_eq!(updated.amount, Decimal::new(1300, 0));
}

// ── Falhas do backend ──────────────────────────────────────────────────────

#[tokio::test]
async fn failed_fetch_empties_collection_and_sets_error() {
    let backend = Arc::new(FlakyBackend::default());
    let store = StudioStore::new(backend.clone());

    store.add_client(new_client("Maria")).await.unwrap();
    store.fetch_clients().await;
    assert_eq!(store.clients().await.len(), 1);

    backend.fail_loads.store(true, Ordering::SeqCst);
    store.fetch_clients().await;

    assert!(store.clients().await.is_empty());
    assert!(matches!(store.status(CollectionKind::Clients).await, CollectionStatus::Error(_)));

    // outras coleções não são afetadas
    assert_eq!(store.status(CollectionKind::Expenses).await, CollectionStatus::Idle);

    backend.fail_loads.store(false, Ordering::SeqCst);
    store.fetch_clients().await;
    assert_eq!(store.clients().await.len(), 1);
    assert_eq!(store.status(CollectionKind::Clients).await, CollectionStatus::Ready);
}

#[tokio::test]
async fn failed_mutation_leaves_backend_and_cache_unchanged() {
    let backend = Arc::new(FlakyBackend::default());
    let store = StudioStore::new(backend.clone());

    let client = store.add_client(new_client("Maria")).await.unwrap();
    store.fetch_clients().await;
    let before = store.clients().await;

    backend.fail_writes.store(true, Ordering::SeqCst);
    assert!(store.add_client(new_client("Ana")).await.is_err());
    let changes = ClientChanges { full_name: Some("Outra".into()), phone: None };
    assert!(store.update_client(client.id, changes).await.is_err());
    assert!(store.delete_client(client.id).await.is_err());

    assert_eq!(store.clients().await, before);

    backend.fail_writes.store(false, Ordering::SeqCst);
    store.fetch_clients().await;
    assert_eq!(store.clients().await, before);
}

#[tokio::test]
async fn failed_appointment_update_keeps_fields_and_links() {
    let backend = Arc::new(FlakyBackend::default());
    let store = StudioStore::new(backend.clone());
    let client = store.add_client(new_client("Maria")).await.unwrap();
    let p1 = procedure(&store, "Cílios").await;
    let created = store.add_appointment(new_appointment(client.id), vec![p1.id]).await.unwrap();

    let changes = AppointmentChanges {
        total_value: Some(Decimal::new(300, 0)),
        status: Some(AppointmentStatus::Completed),
        ..Default::default()
    };
    let err = store
        .update_appointment(created.id, changes, Some(vec![p1.id, Uuid::new_v4()]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidReference(_)));

    store.fetch_appointments().await;
    assert_eq!(store.appointments().await, vec![created.clone()]);
    let links = store.appointment_procedure_links(created.id).await.unwrap();
    assert_eq!(links, vec![AppointmentProcedure { appointment_id: created.id, procedure_id: p1.id }]);
}

#[tokio::test]
async fn refetch_failure_after_write_still_reports_success() {
    let backend = Arc::new(FlakyBackend::default());
    let store = StudioStore::new(backend.clone());
    let client = store.add_client(new_client("Maria")).await.unwrap();
    let p1 = procedure(&store, "Cílios").await;

    // a escrita passa, a recarga da coleção falha
    backend.fail_loads.store(true, Ordering::SeqCst);
    let created = store.add_appointment(new_appointment(client.id), vec![p1.id]).await.unwrap();
    assert_eq!(created.client.as_ref().map(|c| c.id), Some(client.id));
    assert_eq!(created.procedures, vec![p1.clone()]);
    assert!(matches!(store.status(CollectionKind::Appointments).await, CollectionStatus::Error(_)));

    let changes = AppointmentChanges { status: Some(AppointmentStatus::Completed), ..Default::default() };
    let updated = store.update_appointment(created.id, changes, None).await.unwrap();
    assert!(updated.is_completed());

    backend.fail_loads.store(false, Ordering::SeqCst);
    store.fetch_appointments().await;
    let appointments = store.appointments().await;
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0].id, created.id);
    assert!(appointments[0].is_completed());
}

#[tokio::test]
async fn store_works_behind_either_backend() {
    let store = StudioStore::new(Arc::new(FixtureBackend::seeded(Utc::now())));
    assert_eq!(store.backend_name(), "fixture");

    tokio::join!(
        store.fetch_clients(),
        store.fetch_procedures(),
        store.fetch_appointments(),
        store.fetch_expenses(),
    );

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.clients.len(), 2);
    assert_eq!(snapshot.procedures.len(), 2);
    assert_eq!(snapshot.appointments.len(), 2);
    assert_eq!(snapshot.expenses.len(), 1);
    assert!(snapshot.appointments.iter().all(|a| a.client.is_some()));
}
