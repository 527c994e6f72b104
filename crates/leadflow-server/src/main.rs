//! Leadflow server entry point.

use anyhow::Context;
use leadflow_db::{DbManager, run_migrations, seed_default_users};
use leadflow_server::{AppState, ServerConfig, build_router, user_repository};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("leadflow=info")),
        )
        .json()
        .init();

    tracing::info!("Starting Leadflow server...");

    let config = ServerConfig::load()?;

    let manager = DbManager::connect(&config.database)
        .await
        .context("Failed to connect to SurrealDB")?;
    let db = manager.client().clone();
    run_migrations(&db).await?;

    let created = seed_default_users(&user_repository(db.clone(), &config), &config.bootstrap)
        .await
        .context("Failed to seed default users")?;
    if created > 0 {
        tracing::info!(created, "Provisioned default accounts");
    }

    let app = build_router(AppState::new(db, &config), &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Leadflow server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
