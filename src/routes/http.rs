//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{State, Query}, Json, response::IntoResponse};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::ManualTest;
use crate::logic::submit_test;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_test(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (tp, origin) = state.new_test_prompt().await;
  info!(target: "testgen", id = %tp.id, %origin, "HTTP test served");
  Json(tp)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_manual_tests(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let tests = state.active_manual_tests().await;
  info!(target: "testgen", count = tests.len(), "HTTP manual tests served");
  Json(tests)
}

#[instrument(level = "info", skip(state, body), fields(title = %body.title))]
pub async fn http_post_manual_test(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CreateManualTestIn>,
) -> impl IntoResponse {
  let test = ManualTest {
    id: Uuid::new_v4().to_string(),
    title: body.title,
    created_by: body.created_by,
    created_at: body.created_at,
    scheduled_date: body.scheduled_date,
    is_active: body.is_active,
    task1: body.task1,
    task2: body.task2,
  };
  info!(target: "testgen", id = %test.id, "HTTP manual test created");
  state.insert_manual_test(test.clone()).await;
  Json(test)
}

#[instrument(level = "info", skip(state, body), fields(student = %body.student_id))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SubmitTestIn>,
) -> impl IntoResponse {
  let result = submit_test(&state, body).await;
  info!(target: "evaluation", id = %result.id, overall = result.overall_score, "HTTP submission evaluated");
  Json(result)
}

#[instrument(level = "info", skip(state), fields(student = ?q.student_id))]
pub async fn http_get_results(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ResultsQuery>,
) -> impl IntoResponse {
  let results = match &q.student_id {
    Some(id) => state.results_for_student(id).await,
    None => state.all_results().await,
  };
  info!(target: "evaluation", count = results.len(), "HTTP results served");
  Json(results)
}
