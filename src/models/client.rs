// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Representa uma cliente vinda do banco (tabela `clients`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,

    #[schema(example = "Maria Silva")]
    pub full_name: String,

    // Formato livre. A validação de 10/11 dígitos é feita no payload.
    #[schema(example = "(11) 99999-9999")]
    pub phone: String,

    pub created_at: DateTime<Utc>,
}

// Campos enviados na criação (id e created_at são gerados pelo backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub full_name: String,
    pub phone: String,
}

// Atualização parcial: `None` mantém o valor atual
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientChanges {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

impl ClientChanges {
    pub fn apply_to(&self, client: &mut Client) {
        if let Some(full_name) = &self.full_name {
            client.full_name = full_name.clone();
        }
        if let Some(phone) = &self.phone {
            client.phone = phone.clone();
        }
    }
}

/// Mantém apenas os dígitos do telefone.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Formata o telefone para exibição.
///
/// 11 dígitos viram `(XX) XXXXX-XXXX`, 10 dígitos viram `(XX) XXXX-XXXX`.
/// Qualquer outra coisa volta como veio.
pub fn format_phone(phone: &str) -> String {
    let digits = phone_digits(phone);
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => phone.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_mobile_and_landline_numbers() {
        assert_eq!(format_phone("11999998888"), "(11) 99999-8888");
        assert_eq!(format_phone("1133334444"), "(11) 3333-4444");
        assert_eq!(format_phone("(11) 3333-4444"), "(11) 3333-4444");
    }

    #[test]
    fn leaves_unexpected_lengths_untouched() {
        assert_eq!(format_phone("12345"), "12345");
        assert_eq!(format_phone(""), "");
    }

    #[test]
    fn changes_only_touch_present_fields() {
        let mut client = Client {
            id: Uuid::new_v4(),
            full_name: "Maria Silva".into(),
            phone: "11999999999".into(),
            created_at: Utc::now(),
        };
        let changes = ClientChanges { phone: Some("11888888888".into()), ..Default::default() };
        changes.apply_to(&mut client);

        assert_eq!(client.full_name, "Maria Silva");
        assert_eq!(client.phone, "11888888888");
    }
}
