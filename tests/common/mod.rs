#![allow(dead_code)]

use axum::Router;
use tempfile::TempDir;

use drill2::db::config::DbConfig;
use drill2::db::Database;
use drill2::services::repetition::SelectionPolicy;

/// A database in its own temp directory. Keep the struct alive for the test.
pub struct TestDb {
    pub db: Database,
    pub dir: TempDir,
}

pub async fn create_test_db() -> TestDb {
    let dir = TempDir::new().expect("failed to create temp dir");
    let config = DbConfig::with_path(dir.path().join("drill2.sqlite3"));
    let db = Database::open(config).await.expect("failed to open database");
    TestDb { db, dir }
}

pub async fn create_test_app() -> (Router, TestDb) {
    let test_db = create_test_db().await;
    let app = drill2::create_app(test_db.db.clone(), SelectionPolicy::default());
    (app, test_db)
}

pub async fn row_count(db: &Database, table: &str) -> i64 {
    sqlx::query_scalar(&format!(r#"SELECT COUNT(*) FROM "{table}""#))
        .fetch_one(db.pool())
        .await
        .expect("count query failed")
}
