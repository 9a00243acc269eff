use std::env;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use training_backend::middleware::{auth, rate_limit};
use training_backend::models::attempt::Attempt;
use training_backend::store::MemoryCollectionStore;
use training_backend::{routes, AppState};

fn init_test_config() {
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("DATABASE_URL", "postgres://localhost/unused");
    env::set_var("ADMIN_EMAIL", "admin@example.com");
    env::set_var("ADMIN_PASSWORD", "admin_secret");
    env::set_var("EHC_DATA_URL", "http://127.0.0.1:9/GetDataEHC");
    env::set_var("EHC_VALPASS_URL", "http://127.0.0.1:9/ValEmpPass");
    env::set_var("MASTER_SISWA_URL", "http://127.0.0.1:9/MasterSISWA");
    let _ = training_backend::config::init_config();
}

fn basic_auth(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", email, password)))
}

fn build_admin_app() -> (AppState, Router) {
    init_test_config();
    let state = AppState::new(Arc::new(MemoryCollectionStore::new()));
    let app = Router::new()
        .route(
            "/api/admin/quiz",
            get(routes::admin::get_quizzes).post(routes::admin::save_quiz),
        )
        .route(
            "/api/admin/program",
            get(routes::admin::get_programs).post(routes::admin::add_program),
        )
        .route(
            "/api/admin/program-siswa/import",
            post(routes::admin::import_program_siswa),
        )
        .route("/api/admin/sync/backfill", post(routes::sync::backfill))
        .layer(axum::middleware::from_fn(auth::require_admin))
        .with_state(state.clone());
    (state, app)
}

async fn body_json(resp: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn authed_post(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", basic_auth("admin@example.com", "admin_secret"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn admin_surface_requires_credentials() {
    let (_state, app) = build_admin_app();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/quiz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/quiz")
                .header("authorization", basic_auth("admin@example.com", "wrong"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/quiz")
                .header(
                    "authorization",
                    basic_auth("ADMIN@EXAMPLE.COM", "admin_secret"),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn saving_a_quiz_requires_questions() {
    let (state, app) = build_admin_app();

    let resp = app
        .clone()
        .oneshot(authed_post(
            "/api/admin/quiz",
            json!({ "lessonName": "Empty", "questions": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .oneshot(authed_post(
            "/api/admin/quiz",
            json!({
                "lessonName": "Safety101",
                "questions": [
                    { "question": "2+2?", "options": ["3", "4"], "correctAnswer": 1 }
                ],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let saved = state
        .quiz_service
        .get_by_lesson("Safety101")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.timer_minutes, 30);
    assert!(saved.is_active);
}

#[tokio::test]
async fn duplicate_program_names_are_rejected() {
    let (_state, app) = build_admin_app();

    let resp = app
        .clone()
        .oneshot(authed_post(
            "/api/admin/program",
            json!({ "namaProgram": "odp timur" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["namaProgram"], "ODP TIMUR");

    let resp = app
        .oneshot(authed_post(
            "/api/admin/program",
            json!({ "namaProgram": "ODP Timur" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bulk_import_reports_partial_failures() {
    let (_state, app) = build_admin_app();

    let resp = app
        .oneshot(authed_post(
            "/api/admin/program-siswa/import",
            json!({
                "rows": [
                    { "login": "a@x.com", "namaProgram": "ODP", "batch": "1" },
                    { "namaProgram": "ODP" },
                    { "login": "c@x.com", "namaProgram": "MDP" }
                ],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["imported"], 2);
    assert_eq!(body["errors"][0]["row"], 3);
}

#[tokio::test]
async fn backfill_endpoint_reports_counts() {
    let (state, app) = build_admin_app();

    state
        .attempt_service
        .record_attempt(
            "a@x.com",
            "Safety101",
            Attempt {
                score: 90,
                grade: "A+".to_string(),
                grade_desc: "LULUS DENGAN MEMUASKAN".to_string(),
                correct: 9,
                total: 10,
                completed_at: Utc::now(),
            },
        )
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(authed_post("/api/admin/sync/backfill", json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["added"], 1);

    let resp = app
        .oneshot(authed_post("/api/admin/sync/backfill", json!({})))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["added"], 0);
    assert_eq!(body["skipped"], 1);
}

#[tokio::test]
async fn rate_limiter_returns_retry_after() {
    init_test_config();
    let state = AppState::new(Arc::new(MemoryCollectionStore::new()));
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::per_minute(2),
            rate_limit::rate_limit_middleware,
        ))
        .with_state(state);

    for _ in 0..2 {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-forwarded-for", "10.0.0.1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-forwarded-for", "10.0.0.1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("retry-after"));

    // A different client is unaffected.
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-forwarded-for", "10.0.0.2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
