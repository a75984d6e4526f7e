use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use drill2::admin::{self, AdminError, AssumeYes, Confirm, InitOutcome, StdinConfirm};
use drill2::config::Config;
use drill2::db::Database;
use drill2::logging::{self, LogConfig};
use drill2::services::repetition::SelectionPolicy;

#[derive(Parser)]
#[command(name = "drill2", about = "Flashcard drilling server and admin tools", version)]
struct Cli {
    /// Database file (overrides DRILL_DATABASE)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Create the database schema
    InitDb {
        /// Overwrite an existing database without asking
        #[arg(long)]
        yes: bool,
    },

    /// Delete every recorded answer
    ClearAnswers {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = cli.database {
        config.db.path = path;
    }

    let _log_guard = logging::init_tracing(&LogConfig::from_env(&config.log_level));

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::InitDb { yes } => init_db(config, yes).await,
        Command::ClearAnswers { yes } => clear_answers(config, yes).await,
    };

    exit_code(result)
}

fn exit_code(result: Result<(), AdminError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(AdminError::Aborted) => {
            eprintln!("Aborting.");
            ExitCode::from(2)
        }
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirm)
    }
}

async fn init_db(config: Config, yes: bool) -> Result<(), AdminError> {
    let path = config.db.path.clone();
    let outcome = admin::init_db(config.db, confirmer(yes).as_mut()).await?;
    match outcome {
        InitOutcome::Created => println!("Initialized database at {}", path.display()),
        InitOutcome::Overwritten => println!("Reinitialized database at {}", path.display()),
    }
    Ok(())
}

async fn clear_answers(config: Config, yes: bool) -> Result<(), AdminError> {
    let db = Database::open(config.db).await?;
    let result = admin::clear_answers(&db, confirmer(yes).as_mut()).await;
    db.close().await;

    let deleted = result?;
    println!("Deleted {deleted} answers");
    Ok(())
}

async fn serve(config: Config) -> Result<(), AdminError> {
    let db = Database::open(config.db.clone()).await?;
    let app = drill2::create_app(db.clone(), SelectionPolicy::new(config.selection.clone()));

    let addr = config.bind_addr();
    tracing::info!(%addr, database = %db.path().display(), "drill2 listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    db.close().await;
    served?;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use drill2::db::config::DbConfig;
    use drill2::services::repetition::SelectionConfig;

    #[test]
    fn exit_code_by_outcome() {
        assert_eq!(exit_code(Ok(())), ExitCode::SUCCESS);
        assert_eq!(exit_code(Err(AdminError::Aborted)), ExitCode::from(2));

        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        assert_eq!(exit_code(Err(AdminError::Io(io))), ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn serve_reports_bind_failure() {
        let dir = tempfile::tempdir().unwrap();
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = taken.local_addr().unwrap();

        let config = Config {
            host: addr.ip(),
            port: addr.port(),
            log_level: "info".to_string(),
            db: DbConfig::with_path(dir.path().join("drill2.sqlite3")),
            selection: SelectionConfig::default(),
        };

        let err = serve(config).await.unwrap_err();
        assert!(matches!(err, AdminError::Io(_)), "got {err:?}");
        assert_eq!(exit_code(Err(err)), ExitCode::FAILURE);
    }
}
