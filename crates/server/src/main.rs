use std::sync::Arc;

use anyhow::Context;
use exambank_server::api::{AppState, create_router};
use exambank_server::config::ServerConfig;
use exambank_server::db::init_pool_and_migrate;
use exambank_server::storage::LocalAttachmentStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    info!("starting exambank server");
    let config = ServerConfig::load().context("failed to load server config")?;

    let db = init_pool_and_migrate(config.database_url()?)
        .await
        .context("failed to initialize database")?;

    tokio::fs::create_dir_all(&config.upload_root)
        .await
        .with_context(|| {
            format!(
                "failed to create upload root: {}",
                config.upload_root.display()
            )
        })?;
    let store = LocalAttachmentStore::new(&config.upload_root, &config.public_upload_prefix);
    info!(
        upload_root = %config.upload_root.display(),
        prefix = %config.public_upload_prefix,
        "attachment store ready"
    );

    let state = Arc::new(AppState::new(db, Arc::new(store), config.transaction));
    let app = create_router(state, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "server is ready, press Ctrl+C to shut down");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received, stopping server");
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
