//! Toystore server binary.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use toystore_kernel::cli::{self, Cli, Command};
use toystore_kernel::{AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(port = config.port, backend = ?config.store_backend, "Configuration loaded");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(state, &config).await,
        Command::CreateAdmin {
            username,
            password,
            fullname,
        } => cli::cmd_create_admin(&state, &username, &password, fullname.as_deref()).await,
    }
}

async fn serve(state: AppState, config: &Config) -> Result<()> {
    let app = toystore_kernel::app(state, config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
