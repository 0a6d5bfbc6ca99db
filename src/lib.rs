//src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use config::{AppState, Settings};
pub use router::router;
