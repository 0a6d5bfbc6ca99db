// src/models/procedure.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub id: Uuid,

    #[schema(example = "Extensão de Cílios")]
    pub name: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProcedure {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureChanges {
    pub name: Option<String>,
}

impl ProcedureChanges {
    pub fn apply_to(&self, procedure: &mut Procedure) {
        if let Some(name) = &self.name {
            procedure.name = name.clone();
        }
    }
}
