use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::db::operations::question::{touch_last_asked, Question, QuestionId, QUESTION_COLUMNS};
use crate::db::{Database, StoreError, StoreResult};

pub type AnswerId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer_id: AnswerId,
    pub question: Question,
    pub text: String,
    pub grade: i64,
    pub time_created: i64,
}

const ANSWER_COLUMNS: &str = r#"
    "answer"."answer_id" AS "a_answer_id",
    "answer"."text" AS "a_text",
    "answer"."grade" AS "a_grade",
    "answer"."time_created" AS "a_time_created"
"#;

impl Answer {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            answer_id: row.try_get("a_answer_id")?,
            question: Question::from_row(row)?,
            text: row.try_get("a_text")?,
            grade: row.try_get("a_grade")?,
            time_created: row.try_get("a_time_created")?,
        })
    }
}

fn joined_select() -> String {
    format!(
        r#"
        SELECT {QUESTION_COLUMNS}, {ANSWER_COLUMNS}
        FROM "answer"
        JOIN "question" ON "answer"."question_id" = "question"."question_id"
        "#
    )
}

pub async fn create_answer(
    db: &Database,
    question_id: QuestionId,
    text: &str,
    grade: i64,
) -> StoreResult<Answer> {
    create_answer_at(db, question_id, text, grade, Utc::now().timestamp()).await
}

/// Records a graded answer and stamps the question's `time_last_asked` with
/// the same instant. Both writes commit together or not at all; on failure
/// the transaction is rolled back and the original error is returned.
pub async fn create_answer_at(
    db: &Database,
    question_id: QuestionId,
    text: &str,
    grade: i64,
    time_created: i64,
) -> StoreResult<Answer> {
    let mut tx = db.pool().begin().await?;

    match insert_answer(&mut tx, question_id, text, grade, time_created).await {
        Ok(answer) => {
            tx.commit().await?;
            tracing::debug!(
                answer_id = answer.answer_id,
                question_id,
                grade,
                "answer recorded"
            );
            Ok(answer)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, question_id, "answer rollback failed");
            }
            Err(err)
        }
    }
}

async fn insert_answer(
    conn: &mut SqliteConnection,
    question_id: QuestionId,
    text: &str,
    grade: i64,
    time_created: i64,
) -> StoreResult<Answer> {
    // Write the question first so a missing id fails before the insert and
    // the transaction takes the write lock on its first statement.
    touch_last_asked(conn, question_id, time_created).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO "answer" ("question_id", "text", "grade", "time_created")
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(question_id)
    .bind(text)
    .bind(grade)
    .bind(time_created)
    .execute(&mut *conn)
    .await
    .map_err(|err| StoreError::classify(err, format!("question {question_id}")))?;

    fetch_answer_with(conn, result.last_insert_rowid()).await
}

pub async fn list_answers(db: &Database) -> StoreResult<Vec<Answer>> {
    let sql = joined_select();
    let rows = sqlx::query(&sql).fetch_all(db.pool()).await?;
    let answers = rows
        .iter()
        .map(Answer::from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(answers)
}

pub async fn fetch_answer(db: &Database, answer_id: AnswerId) -> StoreResult<Answer> {
    let mut conn = db.pool().acquire().await?;
    fetch_answer_with(&mut conn, answer_id).await
}

async fn fetch_answer_with(conn: &mut SqliteConnection, answer_id: AnswerId) -> StoreResult<Answer> {
    let sql = format!(r#"{} WHERE "answer"."answer_id" = ?1"#, joined_select());
    let row = sqlx::query(&sql)
        .bind(answer_id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => Ok(Answer::from_row(&row)?),
        None => Err(StoreError::NotFound(format!("answer {answer_id}"))),
    }
}

pub async fn count_answers(db: &Database) -> StoreResult<i64> {
    let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "answer""#)
        .fetch_one(db.pool())
        .await?;
    Ok(count)
}

/// Deletes the whole answer log. Questions are left untouched.
pub async fn clear_answers(db: &Database) -> StoreResult<u64> {
    let result = sqlx::query(r#"DELETE FROM "answer""#)
        .execute(db.pool())
        .await?;
    Ok(result.rows_affected())
}
