pub mod backend;
pub use backend::StudioBackend;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod procedure_repo;
pub use procedure_repo::ProcedureRepository;
pub mod appointment_repo;
pub use appointment_repo::AppointmentRepository;
pub mod expense_repo;
pub use expense_repo::ExpenseRepository;

pub mod postgres;
pub use postgres::PgBackend;
pub mod fixture;
pub use fixture::FixtureBackend;
