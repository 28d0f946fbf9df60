//! Convenios server entry point

mod config;

use agreements_service::AgreementsServiceModule;
use anyhow::{Context, Result};
use clap::Parser;
use config::{LoggingConfig, ServerConfig};
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "convenios-server", about = "Cooperation agreements service")]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Apply migrations and exit
    #[arg(long)]
    migrate_only: bool,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    if logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServerConfig::load(args.config.as_deref())?;
    init_tracing(&config.logging);

    let db = sea_orm::Database::connect(config.database.url.as_str())
        .await
        .context("failed to connect to database")?;

    let module = AgreementsServiceModule::from_config(
        db,
        config.agreements.clone(),
        config.auth()?,
        config.identity()?,
    )?;
    module.migrate().await?;
    if args.migrate_only {
        return Ok(());
    }

    let app = module
        .router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "convenios server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}
