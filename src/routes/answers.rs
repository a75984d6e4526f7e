use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use crate::db::operations::{self, AnswerId};
use crate::response::{self, AppError};
use crate::routes::path_param;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_answers))
        .route("/:id", get(get_answer))
}

async fn list_answers(State(state): State<AppState>) -> Result<Response, AppError> {
    let answers = operations::list_answers(state.db()).await?;
    Ok(response::ok(answers))
}

async fn get_answer(
    State(state): State<AppState>,
    id: Result<Path<AnswerId>, PathRejection>,
) -> Result<Response, AppError> {
    let id = path_param(id)?;
    let answer = operations::fetch_answer(state.db(), id).await?;
    Ok(response::ok(answer))
}
