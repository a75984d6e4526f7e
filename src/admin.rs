//! Administrative commands: schema initialisation and answer-log clearing.
//! Both ask for confirmation before destroying anything.

use std::io::{BufRead, Write};

use thiserror::Error;

use crate::db::config::DbConfig;
use crate::db::operations;
use crate::db::{sqlite_schema, Database, DbInitError, StoreError};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("aborted by user")]
    Aborted,
    #[error(transparent)]
    Init(#[from] DbInitError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Yes/no prompt used before destructive operations.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Answers yes to everything (`--yes`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Prompts on stderr and reads a line from stdin. Anything but y/yes declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        let mut stderr = std::io::stderr();
        if write!(stderr, "{prompt} [y/N]: ").is_err() || stderr.flush().is_err() {
            return false;
        }

        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        parse_yes(&line)
    }
}

fn parse_yes(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    Overwritten,
}

/// Creates the schema. An existing database file is only wiped after confirmation.
pub async fn init_db(config: DbConfig, confirm: &mut dyn Confirm) -> Result<InitOutcome, AdminError> {
    let exists = config.path.exists();
    if exists && !confirm.confirm("Database already exists. Do you want to overwrite it?") {
        return Err(AdminError::Aborted);
    }

    let db = Database::connect(config).await?;
    let outcome = if exists {
        sqlite_schema::reset_schema(db.pool()).await?;
        InitOutcome::Overwritten
    } else {
        sqlite_schema::apply_schema(db.pool()).await?;
        InitOutcome::Created
    };
    db.close().await;

    tracing::info!(?outcome, "database initialized");
    Ok(outcome)
}

/// Deletes every answer after confirming the row count. Returns rows deleted.
pub async fn clear_answers(db: &Database, confirm: &mut dyn Confirm) -> Result<u64, AdminError> {
    let count = operations::count_answers(db).await?;
    if !confirm.confirm(&format!("Delete 'answer' table of size {count}?")) {
        return Err(AdminError::Aborted);
    }

    let deleted = operations::clear_answers(db).await?;
    tracing::info!(deleted, "answer log cleared");
    Ok(deleted)
}
