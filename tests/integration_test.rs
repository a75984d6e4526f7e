use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_root() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_health_live() {
    let (app, _db) = common::create_test_app().await;

    let (status, _) = send(&app, get("/health/live")).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_next_question_empty_is_null() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(&app, get("/api/drill/next")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_drill_round_trip() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(
        &app,
        post_json("/api/questions", json!({ "text": "2+2", "answer": "4" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let question_id = body["data"]["questionId"].as_i64().unwrap();
    assert_eq!(body["data"]["strength"], 0);
    assert!(body["data"]["timeLastAsked"].is_null());

    let (status, body) = send(&app, get("/api/drill/next")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["questionId"], question_id);

    let (status, body) = send(
        &app,
        post_json(
            "/api/drill/check",
            json!({ "questionId": question_id, "answer": "  4 " }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["submittedAnswer"], "4");
    assert_eq!(body["data"]["question"]["answer"], "4");

    let (status, body) = send(
        &app,
        post_json(
            "/api/drill/grade",
            json!({ "questionId": question_id, "answer": "4", "grade": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let answer_time = body["data"]["timeCreated"].as_i64().unwrap();
    assert_eq!(body["data"]["grade"], 5);
    assert_eq!(body["data"]["question"]["questionId"], question_id);

    let (status, body) = send(&app, get(&format!("/api/questions/{question_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["timeLastAsked"], answer_time);
    assert_eq!(body["data"]["strength"], 0);

    let (status, body) = send(&app, get("/api/answers")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_question_validation_error() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(
        &app,
        post_json("/api/questions", json!({ "text": "  ", "answer": "4" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_grade_unknown_question_not_found() {
    let (app, test_db) = common::create_test_app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/drill/grade",
            json!({ "questionId": 41, "answer": "4", "grade": 5 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(common::row_count(&test_db.db, "answer").await, 0);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(
        &app,
        post_json("/api/drill/grade", json!({ "questionId": "seven" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_missing_answer_is_not_found() {
    let (app, _db) = common::create_test_app().await;

    let (status, _) = send(&app, get("/api/answers/12")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let (app, _db) = common::create_test_app().await;

    for uri in ["/api/questions/abc", "/api/answers/abc"] {
        let (status, body) = send(&app, get(uri)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false, "{uri}");
        assert_eq!(body["code"], "BAD_REQUEST", "{uri}");
    }
}

#[tokio::test]
async fn test_unknown_route_uses_fallback() {
    let (app, _db) = common::create_test_app().await;

    let (status, body) = send(&app, get("/api/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
