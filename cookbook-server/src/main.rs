//! Cookbook Server - REST API for recipes and their ingredients

mod api;
mod app;
mod config;
mod error;
mod health;
mod metrics;
mod service;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cookbook_store::{MemoryRecipeStore, PgRecipeStore, RecipeStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::{build_router, AppState};
use config::{Cli, Command, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cli.config).await,
        Command::Migrate => migrate(cli.config).await,
    }
}

async fn connect(config: &ServerConfig, url: &str) -> Result<PgRecipeStore> {
    let shown = config.redacted_database_url().unwrap_or_default();
    let store = PgRecipeStore::connect(url, config.max_connections)
        .await
        .with_context(|| format!("Failed to connect to database at {}", shown))?;
    info!("Connected to database at {}", shown);
    Ok(store)
}

async fn open_store(config: &ServerConfig) -> Result<Arc<dyn RecipeStore>> {
    let Some(url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set. Running without persistence.");
        return Ok(Arc::new(MemoryRecipeStore::new()));
    };

    let store = connect(config, url).await?;
    if config.skip_migrations {
        info!("Skipping schema migrations");
    } else {
        store.migrate().await.context("Failed to apply schema")?;
    }
    Ok(Arc::new(store))
}

async fn serve(config: ServerConfig) -> Result<()> {
    let store = open_store(&config).await?;
    let state = Arc::new(AppState::new(store));
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Starting Cookbook server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn migrate(config: ServerConfig) -> Result<()> {
    let Some(url) = config.database_url.as_deref() else {
        bail!("migrate requires --database-url or DATABASE_URL");
    };
    let store = connect(&config, url).await?;
    store.migrate().await.context("Failed to apply schema")?;
    info!("Schema is up to date");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining connections");
}
