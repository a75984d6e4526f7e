use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::db::{Database, StoreError, StoreResult};

pub type QuestionId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_id: QuestionId,
    pub text: String,
    pub answer: String,
    pub strength: i64,
    /// Seconds since epoch of the most recent graded answer.
    pub time_last_asked: Option<i64>,
    pub time_created: i64,
}

/// Question columns, aliased so they never collide with answer columns in joins.
pub(crate) const QUESTION_COLUMNS: &str = r#"
    "question"."question_id" AS "q_question_id",
    "question"."text" AS "q_text",
    "question"."answer" AS "q_answer",
    "question"."strength" AS "q_strength",
    "question"."time_last_asked" AS "q_time_last_asked",
    "question"."time_created" AS "q_time_created"
"#;

impl Question {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            question_id: row.try_get("q_question_id")?,
            text: row.try_get("q_text")?,
            answer: row.try_get("q_answer")?,
            strength: row.try_get("q_strength")?,
            time_last_asked: row.try_get("q_time_last_asked")?,
            time_created: row.try_get("q_time_created")?,
        })
    }
}

fn require_non_empty(field: &str, value: &str) -> StoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub async fn create_question(db: &Database, text: &str, answer: &str) -> StoreResult<QuestionId> {
    create_question_at(db, text, answer, Utc::now().timestamp()).await
}

/// Inserts a question with `strength = 0` and no last-asked time, stamped `time_created`.
pub async fn create_question_at(
    db: &Database,
    text: &str,
    answer: &str,
    time_created: i64,
) -> StoreResult<QuestionId> {
    let text = require_non_empty("question text", text)?;
    let answer = require_non_empty("answer", answer)?;

    let result = sqlx::query(
        r#"
        INSERT INTO "question" ("text", "answer", "strength", "time_created")
        VALUES (?1, ?2, 0, ?3)
        "#,
    )
    .bind(&text)
    .bind(&answer)
    .bind(time_created)
    .execute(db.pool())
    .await?;

    let question_id = result.last_insert_rowid();
    tracing::debug!(question_id, "question created");
    Ok(question_id)
}

pub async fn list_questions(db: &Database) -> StoreResult<Vec<Question>> {
    let sql = format!(r#"SELECT {QUESTION_COLUMNS} FROM "question""#);
    let rows = sqlx::query(&sql).fetch_all(db.pool()).await?;
    let questions = rows
        .iter()
        .map(Question::from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(questions)
}

pub async fn fetch_question(db: &Database, question_id: QuestionId) -> StoreResult<Question> {
    let mut conn = db.pool().acquire().await?;
    fetch_question_with(&mut conn, question_id).await
}

pub(crate) async fn fetch_question_with(
    conn: &mut SqliteConnection,
    question_id: QuestionId,
) -> StoreResult<Question> {
    let sql = format!(r#"SELECT {QUESTION_COLUMNS} FROM "question" WHERE "question_id" = ?1"#);
    let row = sqlx::query(&sql)
        .bind(question_id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => Ok(Question::from_row(&row)?),
        None => Err(StoreError::NotFound(format!("question {question_id}"))),
    }
}

/// Stamps `time_last_asked`; only called inside the answer transaction.
pub(crate) async fn touch_last_asked(
    conn: &mut SqliteConnection,
    question_id: QuestionId,
    time_last_asked: i64,
) -> StoreResult<()> {
    let result = sqlx::query(
        r#"UPDATE "question" SET "time_last_asked" = ?1 WHERE "question_id" = ?2"#,
    )
    .bind(time_last_asked)
    .bind(question_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(format!("question {question_id}")));
    }
    Ok(())
}
