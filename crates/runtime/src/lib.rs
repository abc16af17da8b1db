use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use loginreg_auth::{Authenticator, SessionManager};
use loginreg_config::AppConfig;
use loginreg_database::{initialize_database, SessionRepository, UserRepository};
use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Everything the HTTP layer needs, wired against SQLite.
#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub sessions: SessionManager,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(Arc::new(UserRepository::new(db_pool.clone())));
        let sessions = SessionManager::new(
            Arc::new(SessionRepository::new(db_pool.clone())),
            &config.auth,
        );

        info!(
            session_ttl_seconds = sessions.ttl().num_seconds(),
            "authentication subsystem ready"
        );

        Ok(Self {
            db_pool,
            authenticator,
            sessions,
        })
    }

    /// Purge expired sessions every `interval` until the task is aborted.
    pub fn spawn_session_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let sessions = self.sessions.clone();
        let interval = interval.max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match sessions.purge_expired().await {
                    Ok(0) => {}
                    Ok(removed) => debug!(removed, "purged expired sessions"),
                    Err(error) => warn!(?error, "failed to purge expired sessions"),
                }
            }
        })
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
