use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use crate::db::operations::QuestionId;
use crate::response::{self, AppError};
use crate::routes::json_body;
use crate::services::drill;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/next", get(next_question))
        .route("/check", post(check_answer))
        .route("/grade", post(submit_grade))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckAnswerRequest {
    question_id: QuestionId,
    answer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitGradeRequest {
    question_id: QuestionId,
    answer: String,
    grade: i64,
}

async fn next_question(State(state): State<AppState>) -> Result<Response, AppError> {
    let mut rng = StdRng::from_os_rng();
    let policy = state.policy();
    let question =
        drill::next_question(state.db(), &policy, Utc::now().timestamp(), &mut rng).await?;
    Ok(response::ok(question))
}

async fn check_answer(
    State(state): State<AppState>,
    payload: Result<Json<CheckAnswerRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(payload)?;
    let preview = drill::check_answer(state.db(), req.question_id, &req.answer).await?;
    Ok(response::ok(preview))
}

async fn submit_grade(
    State(state): State<AppState>,
    payload: Result<Json<SubmitGradeRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(payload)?;
    let answer = drill::submit_grade(state.db(), req.question_id, &req.answer, req.grade).await?;
    Ok(response::created(answer))
}
