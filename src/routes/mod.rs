mod answers;
mod drill;
mod health;
mod questions;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::de::DeserializeOwned;

use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let healthcheck_endpoint = normalize_healthcheck_endpoint(
        std::env::var("HEALTHCHECK_ENDPOINT")
            .ok()
            .as_deref()
            .unwrap_or("/health"),
    );

    Router::new()
        .nest("/api/drill", drill::router())
        .nest("/api/questions", questions::router())
        .nest("/api/answers", answers::router())
        .nest(healthcheck_endpoint.as_str(), health::router())
        .fallback(fallback_handler)
        .with_state(state)
}

/// Unwraps a JSON body, turning extractor rejections into the usual error envelope.
pub(crate) fn json_body<T: DeserializeOwned>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

pub(crate) fn path_param<T>(param: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    param
        .map(|Path(value)| value)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

fn normalize_healthcheck_endpoint(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return "/health".to_string();
    }

    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

async fn fallback_handler() -> Response {
    AppError::not_found("route does not exist").into_response()
}
