use sqlx::SqlitePool;

pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");
pub const SCHEMA_VERSION: &str = "1.0.0";

const DROP_TABLES_SQL: &str = r#"
DROP TABLE IF EXISTS "answer";
DROP TABLE IF EXISTS "question";
DROP TABLE IF EXISTS "_db_metadata";
"#;

pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut prev = '\0';

    for ch in sql.chars() {
        match ch {
            '\'' if !in_double_quote && prev != '\\' => {
                in_single_quote = !in_single_quote;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
            }
            ';' if !in_single_quote && !in_double_quote => {
                let stmt = current.trim();
                if !stmt.is_empty() {
                    statements.push(stmt.to_string());
                }
                current.clear();
                prev = ch;
                continue;
            }
            _ => {}
        }

        current.push(ch);
        prev = ch;
    }

    let tail = current.trim();
    if !tail.is_empty() {
        statements.push(tail.to_string());
    }

    statements
}

/// Strips `--` comment lines from a statement; returns `None` when nothing executable remains.
fn executable_sql(stmt: &str) -> Option<String> {
    let sql = stmt
        .lines()
        .filter(|line| !line.trim().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

async fn execute_script(pool: &SqlitePool, script: &str) -> Result<(), sqlx::Error> {
    for stmt in split_sql_statements(script) {
        if let Some(sql) = executable_sql(&stmt) {
            sqlx::query(&sql).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn schema_version(pool: &SqlitePool) -> Result<Option<String>, sqlx::Error> {
    let table: Option<String> = sqlx::query_scalar(
        r#"SELECT "name" FROM "sqlite_master" WHERE "type" = 'table' AND "name" = '_db_metadata'"#,
    )
    .fetch_optional(pool)
    .await?;

    if table.is_none() {
        return Ok(None);
    }

    sqlx::query_scalar(r#"SELECT "value" FROM "_db_metadata" WHERE "key" = 'schema_version'"#)
        .fetch_optional(pool)
        .await
}

/// Creates any missing tables and stamps the schema version.
pub async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    execute_script(pool, SCHEMA_SQL).await?;

    sqlx::query(
        r#"INSERT OR REPLACE INTO "_db_metadata" ("key", "value") VALUES ('schema_version', ?1)"#,
    )
    .bind(SCHEMA_VERSION)
    .execute(pool)
    .await?;

    Ok(())
}

/// Drops every drill table and recreates the schema from scratch.
pub async fn reset_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    execute_script(pool, DROP_TABLES_SQL).await?;
    apply_schema(pool).await
}
