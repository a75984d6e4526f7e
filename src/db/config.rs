use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    pub journal_mode: SqliteJournalMode,
    pub synchronous: SqliteSynchronous,
    pub busy_timeout: Duration,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn from_env() -> Self {
        let path = std::env::var("DRILL_DATABASE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| resolve_path(&value))
            .unwrap_or_else(default_db_path);

        let journal_mode = std::env::var("SQLITE_JOURNAL_MODE")
            .ok()
            .as_deref()
            .and_then(SqliteJournalMode::parse)
            .unwrap_or(SqliteJournalMode::Wal);

        let synchronous = std::env::var("SQLITE_SYNCHRONOUS")
            .ok()
            .as_deref()
            .and_then(SqliteSynchronous::parse)
            .unwrap_or(SqliteSynchronous::Normal);

        let busy_timeout_ms = env_u64("SQLITE_BUSY_TIMEOUT_MS", 5000);
        let max_connections = env_u32("SQLITE_MAX_CONNECTIONS", 5).max(1);

        Self {
            path,
            journal_mode,
            synchronous,
            busy_timeout: Duration::from_millis(busy_timeout_ms),
            max_connections,
        }
    }

    /// Config for an explicit database file, other settings at their defaults.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            journal_mode: SqliteJournalMode::Wal,
            synchronous: SqliteSynchronous::Normal,
            busy_timeout: Duration::from_millis(5000),
            max_connections: 5,
        }
    }
}

pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("drill2")
        .join("drill2.sqlite3")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqliteJournalMode {
    Wal,
    Delete,
    Truncate,
    Persist,
    Memory,
    Off,
}

impl SqliteJournalMode {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "WAL" => Some(Self::Wal),
            "DELETE" => Some(Self::Delete),
            "TRUNCATE" => Some(Self::Truncate),
            "PERSIST" => Some(Self::Persist),
            "MEMORY" => Some(Self::Memory),
            "OFF" => Some(Self::Off),
            _ => None,
        }
    }

    pub const fn to_sqlx(self) -> sqlx::sqlite::SqliteJournalMode {
        use sqlx::sqlite::SqliteJournalMode as Mode;
        match self {
            SqliteJournalMode::Wal => Mode::Wal,
            SqliteJournalMode::Delete => Mode::Delete,
            SqliteJournalMode::Truncate => Mode::Truncate,
            SqliteJournalMode::Persist => Mode::Persist,
            SqliteJournalMode::Memory => Mode::Memory,
            SqliteJournalMode::Off => Mode::Off,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqliteSynchronous {
    Off,
    Normal,
    Full,
    Extra,
}

impl SqliteSynchronous {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "OFF" => Some(Self::Off),
            "NORMAL" => Some(Self::Normal),
            "FULL" => Some(Self::Full),
            "EXTRA" => Some(Self::Extra),
            _ => None,
        }
    }

    pub const fn to_sqlx(self) -> sqlx::sqlite::SqliteSynchronous {
        use sqlx::sqlite::SqliteSynchronous as Level;
        match self {
            SqliteSynchronous::Off => Level::Off,
            SqliteSynchronous::Normal => Level::Normal,
            SqliteSynchronous::Full => Level::Full,
            SqliteSynchronous::Extra => Level::Extra,
        }
    }
}

pub(crate) fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(default)
}

fn resolve_path(value: &str) -> PathBuf {
    let raw = Path::new(value);
    if raw.is_absolute() {
        return raw.to_path_buf();
    }
    std::env::current_dir()
        .map(|dir| dir.join(raw))
        .unwrap_or_else(|_| raw.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journal_mode_parse_is_case_insensitive() {
        assert_eq!(SqliteJournalMode::parse("wal"), Some(SqliteJournalMode::Wal));
        assert_eq!(SqliteJournalMode::parse("DELETE"), Some(SqliteJournalMode::Delete));
        assert_eq!(SqliteJournalMode::parse("bogus"), None);
    }

    #[test]
    fn synchronous_parse() {
        assert_eq!(SqliteSynchronous::parse("full"), Some(SqliteSynchronous::Full));
        assert_eq!(SqliteSynchronous::parse(""), None);
    }

    #[test]
    fn with_path_keeps_path() {
        let config = DbConfig::with_path("/tmp/drill.sqlite3");
        assert_eq!(config.path, PathBuf::from("/tmp/drill.sqlite3"));
        assert_eq!(config.journal_mode, SqliteJournalMode::Wal);
    }

    #[test]
    fn default_path_ends_with_file_name() {
        assert!(default_db_path().ends_with("drill2/drill2.sqlite3"));
    }
}
