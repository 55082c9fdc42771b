use std::sync::Arc;

use axum::{
  body::{to_bytes, Body},
  http::{Request, StatusCode},
  Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use mcq_extract::config::ExtractorConfig;
use mcq_extract::routes::build_router;
use mcq_extract::state::AppState;

const CHAPTER: &str = "b89cc0b0-2acd-4003-9c61-dbc771402574";

const DOC: &str = "Multiple Choice Questions\n\
  1. Dimensional formula of pressure is\n\
  (a) [M L T] 1 -1 -2 (b) [M L T] 1 1 -2 (c) [M L T] 1 2 -2 (d) [M L T] 0 1 -1\n\
  2. SI unit of momentum is (a) kg.m.s-1 (b) N (c) J (d) W\n\
  3. Hi? (a) p (b) q (c) r (d) s\n\
  4. Which quantity is dimensionless?\n\
  SOLUTIONS\n\
  1. (a) 2. (a) 3. (b)\n\
  1. Pressure = force / area.\n";

fn app() -> Router {
  let state = AppState::with_config(ExtractorConfig::default()).unwrap();
  build_router(Arc::new(state))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(b) => builder.header("content-type", "application/json").body(Body::from(b.to_string())).unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn health_is_ok() {
  let (status, body) = call(&app(), "GET", "/api/v1/health", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn extract_returns_counts_records_and_rejections() {
  let app = app();
  let (status, body) = call(
    &app,
    "POST",
    "/api/v1/extract",
    Some(json!({ "text": DOC, "chapterId": CHAPTER, "chapterName": "Units" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["counts"], json!({ "extracted": 3, "sanitized": 2, "rejected": 1, "skipped": 1 }));

  let first = &body["records"][0];
  assert_eq!(first["option_a"], "[M^1 L^-1 T^-2]");
  assert_eq!(first["option_d"], "[L^1 T^-1]");
  assert_eq!(first["correct_option"], "A");
  assert_eq!(first["description"], "Pressure = force / area.");
  assert_eq!(first["chapter_id"], CHAPTER);
  assert_eq!(first["user_id"], Value::Null);
  assert_eq!(body["records"][1]["option_a"], "kg * m * s^-1");

  assert_eq!(body["rejections"][0]["ordinal"], 3);
  assert_eq!(body["rejections"][0]["code"], "question_too_short");
  assert_eq!(body["skipped"], json!([4]));

  let (_, stats) = call(&app, "GET", "/api/v1/stats", None).await;
  assert_eq!(stats, json!({ "documentsProcessed": 1, "documentsFailed": 0, "recordsEmitted": 2 }));
}

#[tokio::test]
async fn quiz_endpoint_uses_labelled_options() {
  let (status, body) = call(
    &app(),
    "POST",
    "/api/v1/extract/quiz",
    Some(json!({ "text": DOC, "chapterId": CHAPTER, "chapterName": "Units" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().map(Vec::len), Some(2));
  assert_eq!(body[1]["options"]["B"], "N");
  assert_eq!(body[1]["answer"], "A");
  assert_eq!(body[1]["reason"], "");
}

#[tokio::test]
async fn missing_section_is_unprocessable() {
  let app = app();
  let (status, body) = call(
    &app,
    "POST",
    "/api/v1/extract",
    Some(json!({ "text": "no questions here", "chapterId": CHAPTER, "chapterName": "Units" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].as_str().unwrap().starts_with("question section not found"));

  let (_, stats) = call(&app, "GET", "/api/v1/stats", None).await;
  assert_eq!(stats["documentsFailed"], 1);
}

#[tokio::test]
async fn bad_chapter_id_is_bad_request() {
  let (status, body) = call(
    &app(),
    "POST",
    "/api/v1/extract",
    Some(json!({ "text": DOC, "chapterId": "chapter-six", "chapterName": "Units" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("chapter-six"));
}

#[tokio::test]
async fn format_endpoint_applies_field_cleaning() {
  let (status, body) = call(&app(), "POST", "/api/v1/format", Some(json!({ "text": "3 x 10^8  m/s2" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["formatted"], "3 * 10^8 m / s^2");
}
