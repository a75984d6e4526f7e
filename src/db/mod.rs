pub mod config;
pub mod operations;
pub mod sqlite_schema;

use std::path::Path;
use std::time::{Duration, Instant};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::config::DbConfig;

/// Shared handle to the drill database. Cloning is cheap; every operation
/// checks a connection out of the pool and returns it when done.
#[derive(Clone)]
pub struct Database {
    config: DbConfig,
    pool: SqlitePool,
}

impl Database {
    pub async fn from_env() -> Result<Self, DbInitError> {
        Self::open(DbConfig::from_env()).await
    }

    /// Connects and makes sure the schema exists.
    pub async fn open(config: DbConfig) -> Result<Self, DbInitError> {
        let db = Self::connect(config).await?;
        db.ensure_schema().await?;
        Ok(db)
    }

    /// Connects without touching the schema.
    pub async fn connect(config: DbConfig) -> Result<Self, DbInitError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(config.journal_mode.to_sqlx())
            .synchronous(config.synchronous.to_sqlx())
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.busy_timeout + Duration::from_secs(1))
            .connect_with(options)
            .await?;

        tracing::debug!(path = %config.path.display(), "sqlite pool connected");

        Ok(Self { config, pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub async fn ensure_schema(&self) -> Result<(), DbInitError> {
        let version = sqlite_schema::schema_version(&self.pool).await?;
        if version.is_some() {
            return Ok(());
        }

        sqlite_schema::apply_schema(&self.pool).await?;
        tracing::info!(
            path = %self.config.path.display(),
            version = sqlite_schema::SCHEMA_VERSION,
            "database schema initialized"
        );
        Ok(())
    }

    pub async fn check_health(&self) -> Result<Duration, sqlx::Error> {
        let started = Instant::now();
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(started.elapsed())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Failure kinds surfaced by the question store and answer log.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps a driver error, treating missing rows and foreign key violations
    /// as `NotFound` for `entity`.
    pub(crate) fn classify(err: sqlx::Error, entity: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound(entity.into()),
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Self::NotFound(entity.into())
            }
            _ => Self::Storage(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
