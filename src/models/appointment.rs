// src/models/appointment.rs

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{client::Client, procedure::Procedure};

// --- STATUS ---

// Enumeração aberta: o schema do banco guarda TEXT, então qualquer valor
// desconhecido é preservado em `Other` em vez de virar erro.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    #[default]
    Scheduled, // agendado
    Completed, // concluído
    Cancelled, // cancelado
    Other(String),
}

impl AppointmentStatus {
    pub const SCHEDULED: &'static str = "agendado";
    pub const COMPLETED: &'static str = "concluído";
    pub const CANCELLED: &'static str = "cancelado";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Scheduled => Self::SCHEDULED,
            Self::Completed => Self::COMPLETED,
            Self::Cancelled => Self::CANCELLED,
            Self::Other(value) => value,
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::SCHEDULED => Self::Scheduled,
            Self::COMPLETED => Self::Completed,
            Self::CANCELLED => Self::Cancelled,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for AppointmentStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- AGENDAMENTO ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub appointment_date: DateTime<Utc>,

    #[schema(example = "150.00")]
    pub total_value: Decimal,

    #[sqlx(try_from = "String")]
    #[schema(value_type = String, example = "agendado")]
    pub status: AppointmentStatus,

    pub created_at: DateTime<Utc>,

    // Join resolvido na leitura, nunca gravado
    #[sqlx(skip)]
    #[serde(default)]
    pub client: Option<Client>,

    #[sqlx(skip)]
    #[serde(default)]
    pub procedures: Vec<Procedure>,
}

impl Appointment {
    pub fn is_completed(&self) -> bool {
        self.status == AppointmentStatus::Completed
    }

    pub fn is_scheduled(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub client_id: Uuid,
    pub appointment_date: DateTime<Utc>,
    pub total_value: Decimal,

    #[serde(default)]
    #[schema(value_type = String, example = "agendado")]
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentChanges {
    pub client_id: Option<Uuid>,
    pub appointment_date: Option<DateTime<Utc>>,
    pub total_value: Option<Decimal>,

    #[schema(value_type = Option<String>, example = "concluído")]
    pub status: Option<AppointmentStatus>,
}

impl AppointmentChanges {
    pub fn apply_to(&self, appointment: &mut Appointment) {
        if let Some(client_id) = self.client_id {
            appointment.client_id = client_id;
        }
        if let Some(date) = self.appointment_date {
            appointment.appointment_date = date;
        }
        if let Some(value) = self.total_value {
            appointment.total_value = value;
        }
        if let Some(status) = &self.status {
            appointment.status = status.clone();
        }
    }
}

// Linha da tabela de associação appointment_procedures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentProcedure {
    pub appointment_id: Uuid,
    pub procedure_id: Uuid,
}
