// src/handlers.rs

use serde::Serialize;

use crate::services::store::CollectionStatus;

pub mod appointments;
pub mod clients;
pub mod dashboard;
pub mod expenses;
pub mod procedures;
pub mod reports;
pub mod validators;

// Resposta de GET numa coleção: o estado do fetch junto com os itens.
// Em `error` a lista vem vazia, o que não significa "sem registros".
#[derive(Debug, Serialize)]
pub struct CollectionResponse<T> {
    pub status: CollectionStatus,
    pub items: Vec<T>,
}

impl<T> CollectionResponse<T> {
    pub fn new(status: CollectionStatus, items: Vec<T>) -> Self {
        Self { status, items }
    }
}
