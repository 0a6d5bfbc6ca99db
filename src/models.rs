pub mod appointment;
pub mod client;
pub mod expense;
pub mod procedure;
pub mod report;
