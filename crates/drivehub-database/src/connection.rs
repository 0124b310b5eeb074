//! SQLite connection pool management.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};
use sqlx::{Sqlite, Transaction};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use drivehub_core::config::database::DatabaseConfig;
use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;

use crate::migration::run_migrations;

/// Wrapper around the sqlx SQLite connection pool.
///
/// SQLite admits a single writer. Writers queue on an in-process gate
/// before opening their transaction instead of spinning on `SQLITE_BUSY`,
/// which also gives every multi-statement mutation serializable behaviour.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    /// The underlying sqlx connection pool.
    pool: SqlitePool,
    /// Serializes write transactions.
    write_gate: Arc<Mutex<()>>,
}

impl DatabasePool {
    /// Create a new database pool from configuration.
    ///
    /// Runs the embedded migrations when `run_migrations` is set.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %config.url,
            max_connections = config.max_connections,
            "Connecting to SQLite"
        );

        if !config.is_memory() {
            if let Some(parent) = database_path(&config.url).and_then(|p| p.parent()) {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::with_source(
                            ErrorKind::Database,
                            format!("Failed to create database directory {}", parent.display()),
                            e,
                        )
                    })?;
                }
            }
        }

        let mut options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Invalid database URL '{}'", config.url),
                    e,
                )
            })?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        let mut pool_options =
            SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(config.connect_timeout_seconds));

        if config.is_memory() {
            // Every connection to `:memory:` is a separate database, so the
            // pool must hold exactly one connection for its whole lifetime.
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options.journal_mode(SqliteJournalMode::Wal);
            pool_options = pool_options.max_connections(config.max_connections.max(1));
        }

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to connect to database: {e}"),
                e,
            )
        })?;

        let db = Self {
            pool,
            write_gate: Arc::new(Mutex::new(())),
        };

        if config.run_migrations {
            run_migrations(&db.pool).await?;
        }

        info!("Successfully connected to SQLite");
        Ok(db)
    }

    /// Open a private, migrated in-memory database.
    pub async fn memory() -> AppResult<Self> {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        };
        Self::connect(&config).await
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check out a connection for reads.
    ///
    /// Drop it before calling [`begin_write`](Self::begin_write): with an
    /// in-memory database the pool holds a single connection.
    pub async fn acquire(&self) -> AppResult<PoolConnection<Sqlite>> {
        self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })
    }

    /// Wait for the write gate and open a transaction.
    pub async fn begin_write(&self) -> AppResult<WriteTransaction> {
        let gate = Arc::clone(&self.write_gate).lock_owned().await;
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        debug!("Write transaction opened");
        Ok(WriteTransaction { tx, _gate: gate })
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// An open write transaction holding the pool's write gate.
///
/// Dropping it without [`commit`](Self::commit) rolls back.
#[derive(Debug)]
pub struct WriteTransaction {
    tx: Transaction<'static, Sqlite>,
    _gate: OwnedMutexGuard<()>,
}

impl WriteTransaction {
    /// The connection to run statements on.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Commit and release the write gate.
    pub async fn commit(self) -> AppResult<()> {
        self.tx.commit().await.map_err(AppError::from)?;
        debug!("Write transaction committed");
        Ok(())
    }
}

/// Extract the filesystem path from a `sqlite:` URL.
fn database_path(url: &str) -> Option<&Path> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.contains(":memory:") {
        None
    } else {
        Some(Path::new(path))
    }
}
