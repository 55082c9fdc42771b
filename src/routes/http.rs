//! HTTP endpoint handlers. These are thin wrappers that forward to the pipeline.
//! Each handler is instrumented and logs request size and basic result info.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use tracing::{error, info, instrument, warn};

use crate::error::PipelineError;
use crate::export::{to_quiz_items, QuizItem};
use crate::pipeline::DocumentReport;
use crate::protocol::*;
use crate::sanitize::clean_text;
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Handler error mapped onto a status code with an `{error}` body.
#[derive(Debug)]
pub enum ApiError {
  Pipeline(PipelineError),
  Internal(String),
}

impl From<PipelineError> for ApiError {
  fn from(e: PipelineError) -> Self { ApiError::Pipeline(e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Pipeline(e @ PipelineError::SectionNotFound { .. }) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
      ApiError::Pipeline(e @ PipelineError::InvalidChapterId(_)) => (StatusCode::BAD_REQUEST, e.to_string()),
      ApiError::Pipeline(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
      ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
    };
    (status, Json(ErrorOut { error: message })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, body), fields(chapter_id = %body.chapter_id, text_len = body.text.len()))]
pub async fn http_post_extract(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ExtractIn>,
) -> Result<Json<ExtractOut>, ApiError> {
  let report = run_pipeline(&state, body).await?;
  Ok(Json(report.into()))
}

#[instrument(level = "info", skip(state, body), fields(chapter_id = %body.chapter_id, text_len = body.text.len()))]
pub async fn http_post_extract_quiz(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ExtractIn>,
) -> Result<Json<Vec<QuizItem>>, ApiError> {
  let report = run_pipeline(&state, body).await?;
  Ok(Json(to_quiz_items(&report.records)))
}

#[instrument(level = "info", skip(body), fields(text_len = body.text.len()))]
pub async fn http_post_format(Json(body): Json<FormatIn>) -> impl IntoResponse {
  let formatted = clean_text(&body.text);
  info!(target: "http", input = %trunc_for_log(&body.text, 80), output = %trunc_for_log(&formatted, 80), "Expression formatted");
  Json(FormatOut { formatted })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.stats().await)
}

/// Extraction is CPU-bound regex work, so it runs on the blocking pool.
async fn run_pipeline(state: &AppState, body: ExtractIn) -> Result<DocumentReport, ApiError> {
  let extractor = state.extractor.clone();
  let ExtractIn { text, chapter_id, chapter_name } = body;

  let outcome = tokio::task::spawn_blocking(move || extractor.process(&text, &chapter_id, &chapter_name))
    .await
    .map_err(|e| {
      error!(target: "http", error = %e, "Extraction task failed");
      ApiError::Internal(format!("extraction task failed: {e}"))
    })?;

  match outcome {
    Ok(report) => {
      let counts = report.counts();
      state.record_success(counts.sanitized).await;
      info!(
        target: "http",
        chapter = %report.chapter_name,
        extracted = counts.extracted,
        sanitized = counts.sanitized,
        rejected = counts.rejected,
        "Document processed"
      );
      Ok(report)
    }
    Err(e) => {
      state.record_failure().await;
      warn!(target: "http", error = %e, "Document failed");
      Err(e.into())
    }
  }
}
