//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use studio_ledger::{router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; sem ele, info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;

    // Se a configuração falhar, a aplicação não deve iniciar
    let app_state = AppState::new(&settings).await.inspect_err(|e| {
        tracing::error!("🔥 Falha ao inicializar o estado da aplicação: {:?}", e);
    })?;

    let app = router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
