use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use loginreg_backend_api::{build_router, AppState};
use loginreg_config::AppConfig;
use loginreg_runtime::{shutdown_signal, telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "loginreg", version, about = "Login and registration web service")]
struct Cli {
    /// Configuration file; replaces the default search path
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listen address override
    #[arg(long)]
    address: Option<String>,

    /// Listen port override
    #[arg(short, long)]
    port: Option<u16>,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => loginreg_config::load_from(path),
            None => loginreg_config::load(),
        }
        .context("failed to load configuration")?;

        if let Some(address) = &self.address {
            config.http.address = address.clone();
        }
        if let Some(port) = self.port {
            config.http.port = port;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing()?;
    info!("starting loginreg");

    let config = cli.load_config()?;
    let services = BackendServices::initialise(&config).await?;

    let sweeper = services.spawn_session_sweeper(Duration::from_secs(
        config.auth.session_sweep_interval_seconds,
    ));

    let state = AppState::new(
        services.authenticator.clone(),
        services.sessions.clone(),
        &config.auth,
    );
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    sweeper.abort();
    services.db_pool.close().await;
    info!("loginreg shut down");
    Ok(())
}
