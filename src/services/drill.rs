use rand::Rng;
use serde::Serialize;

use crate::db::operations::{self, Answer, Question, QuestionId};
use crate::db::{Database, StoreResult};
use crate::services::repetition::SelectionPolicy;

/// A question shown back next to the user's own response, ready for self-grading.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingPreview {
    pub question: Question,
    pub submitted_answer: String,
}

/// Picks the next question to drill. `None` means there is nothing to ask yet.
pub async fn next_question(
    db: &Database,
    policy: &SelectionPolicy,
    now: i64,
    rng: &mut impl Rng,
) -> StoreResult<Option<Question>> {
    let questions = operations::list_questions(db).await?;
    let picked = policy.select(&questions, now, rng).cloned();

    match &picked {
        Some(question) => tracing::debug!(
            question_id = question.question_id,
            candidates = questions.len(),
            "question selected"
        ),
        None => tracing::debug!("no questions to drill"),
    }

    Ok(picked)
}

pub async fn check_answer(
    db: &Database,
    question_id: QuestionId,
    submitted: &str,
) -> StoreResult<GradingPreview> {
    let question = operations::fetch_question(db, question_id).await?;
    Ok(GradingPreview {
        question,
        submitted_answer: submitted.trim().to_string(),
    })
}

pub async fn submit_grade(
    db: &Database,
    question_id: QuestionId,
    submitted: &str,
    grade: i64,
) -> StoreResult<Answer> {
    let answer = operations::create_answer(db, question_id, submitted.trim(), grade).await?;
    tracing::info!(
        question_id,
        answer_id = answer.answer_id,
        grade,
        "answer submitted"
    );
    Ok(answer)
}

pub async fn add_question(db: &Database, text: &str, answer: &str) -> StoreResult<Question> {
    let question_id = operations::create_question(db, text, answer).await?;
    tracing::info!(question_id, "created question");
    operations::fetch_question(db, question_id).await
}
