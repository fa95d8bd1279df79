//! Database connection pool management
//!
//! Uses sqlx pools with explicit connection limits. SQLite pools are opened
//! in WAL mode with foreign keys enforced, so cascades behave the same on
//! both backends.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use tracing::debug;

use crate::dialect::{Dialect, Driver};
use crate::error::{Result, StoreError};

/// Default maximum connections for the pool.
/// Kept low for single-site blogs.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

/// Pool sizing and timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// Upper bound on waiting for a free connection
    pub acquire_timeout_secs: u64,
    /// SQLite only: how long a writer waits on a locked database
    pub busy_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            busy_timeout_secs: DEFAULT_BUSY_TIMEOUT_SECS,
        }
    }
}

/// A pool for whichever backend the dialect names
#[derive(Debug, Clone)]
pub enum DbPool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl DbPool {
    pub fn driver(&self) -> Driver {
        match self {
            DbPool::Postgres(_) => Driver::Postgres,
            DbPool::Sqlite(_) => Driver::Sqlite,
        }
    }

    pub async fn close(&self) {
        match self {
            DbPool::Postgres(pool) => pool.close().await,
            DbPool::Sqlite(pool) => pool.close().await,
        }
    }
}

/// Create a connection pool for `dialect`.
///
/// # Errors
///
/// Returns [`StoreError::Connectivity`] if the backend cannot be reached.
pub async fn connect(dialect: &dyn Dialect, config: &PoolConfig) -> Result<DbPool> {
    let target = dialect.connection_target();
    let acquire_timeout = Duration::from_secs(config.acquire_timeout_secs);

    match dialect.driver() {
        Driver::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(acquire_timeout)
                .connect(&target)
                .await
                .map_err(StoreError::Connectivity)?;
            Ok(DbPool::Postgres(pool))
        }
        Driver::Sqlite => {
            let path = Path::new(&target);

            // Ensure parent directory exists
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::Connectivity(sqlx::Error::Io(e)))?;
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
                .synchronous(SqliteSynchronous::Normal)
                .foreign_keys(true);

            let pool = SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(acquire_timeout)
                .connect_with(options)
                .await
                .map_err(StoreError::Connectivity)?;
            Ok(DbPool::Sqlite(pool))
        }
    }
}

/// Round-trip a trivial query to prove the pool can serve connections
pub async fn ping(pool: &DbPool) -> Result<()> {
    match pool {
        DbPool::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
        DbPool::Sqlite(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()),
    }
    .map_err(StoreError::Connectivity)?;

    debug!(driver = %pool.driver(), "database reachable");
    Ok(())
}
