//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Evaluating one task submission (guards, evaluator call, fallback)
//!   - Submitting a whole test (both tasks concurrently, result assembly)
//!
//! Both paths are total: the caller always receives a usable value, never
//! an error. Every failure point substitutes a fixed evaluation and logs.

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::band;
use crate::domain::{Task1Result, Task2Result, TaskEvaluation, TestResult, TestStatus, WritingTask};
use crate::extract;
use crate::protocol::SubmitTestIn;
use crate::seeds;
use crate::state::AppState;
use crate::util::word_count;

/// Submissions under this many words are floored locally, regardless of the
/// task's nominal 150/250 minimum. The evaluator cannot be trusted to
/// penalize trivially short input, and the call would be wasted on text that
/// cannot score above the floor anyway.
pub const MIN_EVALUABLE_WORDS: usize = 50;

/// Evaluate one task submission. Stages: degenerate-input guards, one
/// evaluator call, tolerant parse + band validation, fallback.
#[instrument(
  level = "info",
  skip(state, task_prompt, response),
  fields(task = task.number(), response_len = response.len(), has_image = image_url.is_some())
)]
pub async fn evaluate_task(
  state: &AppState,
  task: WritingTask,
  task_prompt: &str,
  response: &str,
  image_url: Option<&str>,
) -> TaskEvaluation {
  if response.trim().is_empty() {
    info!(target: "evaluation", task = task.number(), "Empty submission; returning all-zero evaluation");
    return seeds::no_response_evaluation();
  }

  let words = word_count(response);
  if words < MIN_EVALUABLE_WORDS {
    info!(target: "evaluation", task = task.number(), words, "Submission under evaluation floor; returning band-1 evaluation");
    return seeds::short_response_evaluation(task, words);
  }

  let Some(oa) = &state.openai else {
    warn!(target: "evaluation", task = task.number(), "OpenAI unavailable; returning technical-error evaluation");
    return seeds::technical_error_evaluation();
  };

  match oa.evaluate_writing(&state.prompts, task, task_prompt, response, words, image_url).await {
    Ok(text) => match extract::parse_evaluation(&text, task) {
      Ok(eval) => eval,
      Err(e) => {
        error!(target: "evaluation", task = task.number(), error = %e, "Evaluator output unusable; returning technical-error evaluation");
        seeds::technical_error_evaluation()
      }
    },
    Err(e) => {
      error!(target: "evaluation", task = task.number(), error = %e, "Evaluator call failed; returning technical-error evaluation");
      seeds::technical_error_evaluation()
    }
  }
}

/// Evaluate a whole submission and persist the result.
///
/// The two task evaluations share no state, so both are fired at once and
/// joined. Each arm carries its own fallback boundary; one task failing
/// cannot abort the other's evaluation.
#[instrument(level = "info", skip(state, sub), fields(student = %sub.student_id, test_type = ?sub.test_type))]
pub async fn submit_test(state: &AppState, sub: SubmitTestIn) -> TestResult {
  let (eval1, eval2) = tokio::join!(
    evaluate_task(
      state,
      WritingTask::Task1,
      &sub.task1.prompt,
      &sub.task1.response,
      sub.task1.image_url.as_deref(),
    ),
    evaluate_task(state, WritingTask::Task2, &sub.task2.prompt, &sub.task2.response, None),
  );

  let overall = band::test_overall(eval1.overall_score, eval2.overall_score);
  let result = TestResult {
    id: Uuid::new_v4().to_string(),
    student_id: sub.student_id,
    student_name: sub.student_name,
    test_date: sub.test_date,
    test_type: sub.test_type,
    test_id: sub.test_id,
    task1: Task1Result {
      prompt: sub.task1.prompt,
      response: sub.task1.response,
      score: eval1.overall_score,
      image_url: sub.task1.image_url,
      chart_data: sub.task1.chart_data,
      feedback: eval1.task1_feedback(),
    },
    task2: Task2Result {
      prompt: sub.task2.prompt,
      response: sub.task2.response,
      score: eval2.overall_score,
      feedback: eval2.task2_feedback(),
    },
    overall_score: overall,
    time_spent: sub.time_spent,
    status: TestStatus::Completed,
  };

  info!(
    target: "evaluation",
    id = %result.id,
    task1 = eval1.overall_score,
    task2 = eval2.overall_score,
    overall,
    "Test submission evaluated"
  );

  state.save_result(result.clone()).await;
  result
}

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, sync::Arc};
  use tokio::sync::RwLock;

  use super::*;
  use crate::config::Prompts;
  use crate::domain::TestSource;
  use crate::protocol::{Task1SubmissionIn, Task2SubmissionIn};

  /// State with no OpenAI client: every evaluator-bound path resolves to the
  /// technical-error fallback without touching the network.
  fn offline_state() -> AppState {
    AppState {
      results: Arc::new(RwLock::new(HashMap::new())),
      manual_tests: Arc::new(RwLock::new(HashMap::new())),
      openai: None,
      prompts: Prompts::default(),
    }
  }

  fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
  }

  #[tokio::test]
  async fn empty_submission_scores_zero_without_evaluator() {
    let state = offline_state();
    let eval = evaluate_task(&state, WritingTask::Task1, "Describe the chart.", "   \n ", None).await;
    assert_eq!(eval.overall_score, 0.0);
    assert_eq!(eval.task_criterion.score, 0.0);
    assert_eq!(eval.coherence_cohesion.score, 0.0);
    assert!(eval.task_criterion.feedback.contains("No response"));
  }

  #[tokio::test]
  async fn short_submission_is_floored_at_band_one() {
    let state = offline_state();
    let eval = evaluate_task(&state, WritingTask::Task2, "Discuss.", &words(20), None).await;
    assert_eq!(eval.overall_score, 1.0);
    assert_eq!(eval.lexical_resource.score, 1.0);
    assert!(eval.task_criterion.feedback.contains("20 words"));
    assert!(eval.general_feedback.contains("20/250"));
  }

  #[tokio::test]
  async fn floor_respects_the_boundary() {
    let state = offline_state();
    // 49 words: still floored. 50 words: goes to the evaluator path, which
    // without a client resolves to the technical-error fallback.
    let under = evaluate_task(&state, WritingTask::Task1, "p", &words(49), None).await;
    assert_eq!(under.overall_score, 1.0);
    let over = evaluate_task(&state, WritingTask::Task1, "p", &words(50), None).await;
    assert_eq!(over.overall_score, 4.0);
  }

  #[tokio::test]
  async fn evaluator_failure_yields_neutral_fallback() {
    let state = offline_state();
    let eval = evaluate_task(&state, WritingTask::Task1, "Describe the chart.", &words(200), None).await;
    assert_eq!(eval.overall_score, 4.0);
    assert_eq!(eval.task_criterion.score, 4.0);
    assert!(eval.general_feedback.contains("Technical error"));
  }

  fn submission(task1_response: String, task2_response: String) -> SubmitTestIn {
    SubmitTestIn {
      student_id: "s-1".into(),
      student_name: "Aru".into(),
      test_date: "2025-03-01T10:00:00Z".into(),
      test_type: TestSource::AiGenerated,
      test_id: None,
      time_spent: 3600,
      task1: Task1SubmissionIn {
        prompt: "Describe the chart.".into(),
        response: task1_response,
        image_url: None,
        chart_data: None,
      },
      task2: Task2SubmissionIn {
        prompt: "Discuss both views.".into(),
        response: task2_response,
      },
    }
  }

  #[tokio::test]
  async fn submit_builds_and_persists_the_result() {
    let state = offline_state();
    let result = submit_test(&state, submission(words(200), words(300))).await;

    // Both tasks resolve to the 4.0 fallback offline.
    assert_eq!(result.task1.score, 4.0);
    assert_eq!(result.task2.score, 4.0);
    assert_eq!(result.overall_score, 4.0);
    assert_eq!(result.status, TestStatus::Completed);
    assert_eq!(result.time_spent, 3600);

    let stored = state.results_for_student("s-1").await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, result.id);
  }

  #[tokio::test]
  async fn overall_is_the_rounded_mean_of_task_scores() {
    let state = offline_state();
    // Empty Task 1 (0.0) + short Task 2 (1.0) -> (0.0 + 1.0) / 2 = 0.5.
    let result = submit_test(&state, submission(String::new(), words(10))).await;
    assert_eq!(result.task1.score, 0.0);
    assert_eq!(result.task2.score, 1.0);
    assert_eq!(result.overall_score, 0.5);
  }
}
