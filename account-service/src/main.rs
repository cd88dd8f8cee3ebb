use std::sync::Arc;

use account_service::store::{AccountStore, InMemoryAccountStore, PgAccountStore};
use account_service::{build_app, load_service_config, AppState};
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_service_config()?;

    let store: Arc<dyn AccountStore> = match &config.database {
        Some(settings) => {
            let store = PgAccountStore::connect(settings)
                .await
                .context("Failed to connect to Postgres")?;
            store
                .migrate()
                .await
                .context("Failed to apply account migrations")?;
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; accounts are kept in memory and lost on restart");
            Arc::new(InMemoryAccountStore::new())
        }
    };

    let state = AppState::new(store, config.jwt.clone())?;
    let app = build_app(state, &config)?;

    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "starting account-service");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("account-service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
