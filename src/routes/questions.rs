use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::db::operations::{self, QuestionId};
use crate::response::{self, AppError};
use crate::routes::{json_body, path_param};
use crate::services::drill;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_questions).post(create_question))
        .route("/:id", get(get_question))
}

#[derive(Debug, Deserialize)]
struct CreateQuestionRequest {
    text: String,
    answer: String,
}

async fn list_questions(State(state): State<AppState>) -> Result<Response, AppError> {
    let questions = operations::list_questions(state.db()).await?;
    Ok(response::ok(questions))
}

async fn create_question(
    State(state): State<AppState>,
    payload: Result<Json<CreateQuestionRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(payload)?;
    let question = drill::add_question(state.db(), &req.text, &req.answer).await?;
    Ok(response::created(question))
}

async fn get_question(
    State(state): State<AppState>,
    id: Result<Path<QuestionId>, PathRejection>,
) -> Result<Response, AppError> {
    let id = path_param(id)?;
    let question = operations::fetch_question(state.db(), id).await?;
    Ok(response::ok(question))
}
