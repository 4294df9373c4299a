//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.
//!
//! The core is synchronous and a file-backed catalog does blocking I/O, so every
//! call into it runs on the blocking pool rather than a runtime worker.

use std::sync::Arc;
use axum::{
  extract::{rejection::JsonRejection, Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::domain::Problem;
use crate::error::ApiError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  body.map(|Json(v)| v).map_err(|rejection| ApiError::InvalidPayload(rejection.body_text()))
}

/// Run `f` against the shared state on tokio's blocking pool.
pub(crate) async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> Result<T, ApiError>
where
  T: Send + 'static,
  F: FnOnce(&AppState) -> Result<T, ApiError> + Send + 'static,
{
  let state = Arc::clone(state);
  tokio::task::spawn_blocking(move || f(&state))
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_problems(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Problem>>, ApiError> {
  let problems = blocking(&state, move |s| list_problems(s, q.skip, q.limit)).await?;
  info!(target: "catalog", count = problems.len(), "HTTP problems listed");
  Ok(Json(problems))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_problem(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<Problem>, ApiError> {
  Ok(Json(blocking(&state, move |s| get_problem(s, &id)).await?))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_create_problem(
  State(state): State<Arc<AppState>>,
  body: Result<Json<Problem>, JsonRejection>,
) -> Result<(StatusCode, Json<Problem>), ApiError> {
  let problem = payload(body)?;
  let created = blocking(&state, move |s| create_problem(s, problem)).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_update_problem(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  body: Result<Json<Problem>, JsonRejection>,
) -> Result<Json<Problem>, ApiError> {
  let problem = payload(body)?;
  Ok(Json(blocking(&state, move |s| update_problem(s, &id, problem)).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_problem(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  blocking(&state, move |s| delete_problem(s, &id)).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_generate_assessment(
  State(state): State<Arc<AppState>>,
  body: Result<Json<GenerateIn>, JsonRejection>,
) -> Result<Json<GenerateOut>, ApiError> {
  let req = payload(body)?;
  let out = blocking(&state, move |s| {
    generate_assessment(s, &req.student_profile, &req.assessment_request)
  })
  .await?;
  info!(
    target: "selection",
    plan_id = %out.planner_output.plan_id,
    chosen = out.executor_output.problems.len(),
    total_time = out.executor_output.total_estimated_time,
    "HTTP assessment generated"
  );
  Ok(Json(out))
}
