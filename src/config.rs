// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use chrono::{FixedOffset, Offset, Utc};
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{FixtureBackend, PgBackend, StudioBackend},
    services::{DashboardService, ReportService, StudioStore},
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
// Horário de Brasília
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = -3;

// =========================================================================
//  CONFIGURAÇÕES
// =========================================================================

#[derive(Debug, Clone)]
pub struct Settings {
    /// `None` seleciona o backend de fixture em memória.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub utc_offset: FixedOffset,
}

impl Settings {
    /// Carrega o `.env` (se existir) e lê as variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        // URL vazia ou de exemplo conta como "sem banco"
        let database_url = lookup("DATABASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty() && !url.contains("placeholder"));

        let bind_addr = lookup("BIND_ADDR")
            .map(|addr| addr.trim().to_string())
            .filter(|addr| !addr.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let hours = match lookup("STUDIO_UTC_OFFSET_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i32>()
                .with_context(|| format!("STUDIO_UTC_OFFSET_HOURS inválido: '{raw}'"))?,
            None => DEFAULT_UTC_OFFSET_HOURS,
        };
        if !(-12..=14).contains(&hours) {
            bail!("STUDIO_UTC_OFFSET_HOURS fora do intervalo -12..=14: {hours}");
        }
        let utc_offset = FixedOffset::east_opt(hours * 3600)
            .with_context(|| format!("Offset UTC inválido: {hours}"))?;

        Ok(Self { database_url, bind_addr, utc_offset })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            utc_offset: FixedOffset::west_opt(-DEFAULT_UTC_OFFSET_HOURS * 3600)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

// =========================================================================
//  ESTADO DA APLICAÇÃO
// =========================================================================

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StudioStore>,
    pub dashboard_service: DashboardService,
    pub report_service: ReportService,
    pub utc_offset: FixedOffset,
}

impl AppState {
    /// Escolhe o backend uma única vez, na inicialização.
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let backend: Arc<dyn StudioBackend> = match &settings.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;

                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
                Arc::new(PgBackend::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL não configurada: usando dados de exemplo em memória");
                Arc::new(FixtureBackend::seeded(Utc::now()))
            }
        };

        tracing::info!("Backend selecionado: {}", backend.name());
        Ok(Self::with_backend(backend, settings.utc_offset))
    }

    /// Monta o grafo de dependências sobre um backend já pronto.
    pub fn with_backend(backend: Arc<dyn StudioBackend>, utc_offset: FixedOffset) -> Self {
        let store = Arc::new(StudioStore::new(backend));
        Self {
            dashboard_service: DashboardService::new(store.clone(), utc_offset),
            report_service: ReportService::new(store.clone(), utc_offset),
            store,
            utc_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_select_fixture_and_brasilia() {
        let s = settings(&[]).unwrap();
        assert!(s.database_url.is_none());
        assert_eq!(s.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(s.utc_offset.local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn placeholder_url_counts_as_missing() {
        let s = settings(&[("DATABASE_URL", "postgres://placeholder/db")]).unwrap();
        assert!(s.database_url.is_none());

        let s = settings(&[("DATABASE_URL", "postgres://studio@localhost/studio")]).unwrap();
        assert_eq!(s.database_url.as_deref(), Some("postgres://studio@localhost/studio"));
    }

    #[test]
    fn offset_is_validated() {
        assert_eq!(
            settings(&[("STUDIO_UTC_OFFSET_HOURS", "0")]).unwrap().utc_offset.local_minus_utc(),
            0
        );
        assert!(settings(&[("STUDIO_UTC_OFFSET_HOURS", "15")]).is_err());
        assert!(settings(&[("STUDIO_UTC_OFFSET_HOURS", "abc")]).is_err());
    }

    #[test]
    fn default_matches_empty_environment() {
        let d = Settings::default();
        assert_eq!(d.utc_offset, settings(&[]).unwrap().utc_offset);
    }
}
