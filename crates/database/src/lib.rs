//! Persistence for the login and registration service.
//!
//! Provides the SQLite connection pool, embedded migrations, the
//! [`UserStore`] and [`SessionStore`] interfaces, their SQLite repositories,
//! and in-memory fakes for tests.

use loginreg_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod store;
pub mod types;

pub use connection::prepare_database;
pub use entities::{NewUser, SessionRecord, User};
pub use migrations::run_migrations;
pub use repos::{MemorySessionStore, MemoryUserStore, SessionRepository, UserRepository};
pub use store::{SessionStore, UserStore};
pub use types::{DatabaseError, DatabaseResult};

pub use sqlx::SqlitePool as Pool;

/// Connect and bring the schema up to date
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}
