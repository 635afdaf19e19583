//! lyra-dash - Music project dashboard
//!
//! Reads singer, project and file metadata from the project database and
//! serves a single-page chart dashboard with one interactive chart.
//!
//! Startup is strict: missing configuration or a failing startup query
//! aborts the process.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lyra_common::config::{DbConfig, DbOverrides};
use lyra_common::db::PgSource;
use lyra_dash::dashboard::load_dashboard;
use lyra_dash::interaction::Interactions;
use lyra_dash::layout::compose_page;
use lyra_dash::{build_router, AppState};

/// Command-line arguments for lyra-dash
///
/// Database settings fall back to LYRA_DB_* environment variables and then
/// to the secrets file.
#[derive(Parser, Debug)]
#[command(name = "lyra-dash")]
#[command(about = "Music project analytics dashboard")]
#[command(version)]
struct Args {
    /// Address to serve the dashboard on
    #[arg(short, long, default_value = "127.0.0.1:8050", env = "LYRA_BIND")]
    bind: String,

    /// Database host
    #[arg(long)]
    db_host: Option<String>,

    /// Database port
    #[arg(long)]
    db_port: Option<String>,

    /// Database name
    #[arg(long)]
    db_name: Option<String>,

    /// Database user
    #[arg(long)]
    db_user: Option<String>,

    /// TOML file with host, port, database, user and password keys
    #[arg(long)]
    secrets: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lyra_dash=info,lyra_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lyra dashboard (lyra-dash) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    // Password only from the environment or the secrets file
    let overrides = DbOverrides {
        host: args.db_host,
        port: args.db_port,
        database: args.db_name,
        user: args.db_user,
        password: None,
        secrets_file: args.secrets,
    };
    let db_config = DbConfig::resolve(&overrides).context("Failed to load database configuration")?;

    let source = Arc::new(PgSource::new(db_config.connect_options()));

    let dashboard = match load_dashboard(source.as_ref()).await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            error!("Failed to load dashboard data: {}", e);
            return Err(e).context("Startup query failed");
        }
    };

    let page = compose_page(&dashboard);
    let interactions = Interactions::dashboard(source);
    let app = build_router(AppState::new(page, interactions));

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", args.bind))?;
    info!("lyra-dash listening on http://{}", args.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
