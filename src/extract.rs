//! Tolerant extraction of JSON from evaluator output, plus validation of the
//! extracted object into domain values.
//!
//! The evaluator returns free-form text that is only *expected* to contain a
//! JSON object. Extraction tries, in order: a fenced ```json block, the whole
//! trimmed text, then the substring between the first `{` and the last `}`.
//! First success wins. Validation then asserts the required keys and snaps
//! every score onto the half-band grid before any domain value is built;
//! a violation anywhere surfaces as a `ParseError` and the caller falls back.

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::band;
use crate::domain::{EvaluationCriterion, TaskEvaluation, TestPrompt, WritingTask};

#[derive(Debug, Error)]
pub enum ParseError {
  #[error("no JSON object found in evaluator output")]
  NoJson,
  #[error("invalid JSON: {0}")]
  InvalidJson(#[from] serde_json::Error),
  #[error("missing or malformed field: {0}")]
  MissingField(&'static str),
}

/// Pull a JSON object out of free-form evaluator text.
pub fn extract_json(content: &str) -> Result<Value, ParseError> {
  let trimmed = content.trim();

  // 1) Fenced code block, with or without a "json" tag.
  if let Some(block) = fenced_json_block(trimmed) {
    if let Ok(v) = serde_json::from_str::<Value>(&block) {
      return Ok(v);
    }
  }

  // 2) The entire trimmed text.
  if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
    return Ok(v);
  }

  // 3) Outermost braces, for JSON embedded in prose.
  match (trimmed.find('{'), trimmed.rfind('}')) {
    (Some(first), Some(last)) if first < last => {
      serde_json::from_str::<Value>(&trimmed[first..=last]).map_err(ParseError::from)
    }
    _ => Err(ParseError::NoJson),
  }
}

fn fenced_json_block(s: &str) -> Option<String> {
  let re = Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```").ok()?;
  re.captures(s).map(|c| c[1].to_string())
}

/// Validate an evaluation response for the given task.
/// All four criteria and the overall score are required; every score is
/// snapped to the nearest half-band. Feedback strings default to empty
/// rather than failing the whole evaluation.
pub fn parse_evaluation(content: &str, task: WritingTask) -> Result<TaskEvaluation, ParseError> {
  let v = extract_json(content)?;

  let task_criterion = criterion_from(&v, task.criterion_key())?;
  let coherence_cohesion = criterion_from(&v, "coherenceCohesion")?;
  let lexical_resource = criterion_from(&v, "lexicalResource")?;
  let grammatical_range = criterion_from(&v, "grammaticalRange")?;

  let overall = v
    .get("overallScore")
    .and_then(Value::as_f64)
    .ok_or(ParseError::MissingField("overallScore"))?;
  let general_feedback = v
    .get("generalFeedback")
    .and_then(Value::as_str)
    .unwrap_or_default()
    .to_string();

  Ok(TaskEvaluation {
    task_criterion,
    coherence_cohesion,
    lexical_resource,
    grammatical_range,
    overall_score: band::snap_to_band(overall as f32),
    general_feedback,
  })
}

fn criterion_from(v: &Value, key: &'static str) -> Result<EvaluationCriterion, ParseError> {
  let node = v.get(key).ok_or(ParseError::MissingField(key))?;
  let score = node
    .get("score")
    .and_then(Value::as_f64)
    .ok_or(ParseError::MissingField(key))?;
  let feedback = node
    .get("feedback")
    .and_then(Value::as_str)
    .unwrap_or_default()
    .to_string();
  Ok(EvaluationCriterion { score: band::snap_to_band(score as f32), feedback })
}

/// Validate a generated test and assign it a fresh id (the raw output
/// carries none). Generated tests must come with chart data for Task 1.
pub fn parse_test_prompt(content: &str) -> Result<TestPrompt, ParseError> {
  let v = extract_json(content)?;
  let mut tp: TestPrompt = serde_json::from_value(v)?;

  if tp.task1.prompt.trim().is_empty() {
    return Err(ParseError::MissingField("task1.prompt"));
  }
  if tp.task1.chart_data.as_ref().map_or(true, |c| c.labels.is_empty() || c.datasets.is_empty()) {
    return Err(ParseError::MissingField("task1.chartData"));
  }
  if tp.task2.prompt.trim().is_empty() {
    return Err(ParseError::MissingField("task2.prompt"));
  }

  tp.id = Uuid::new_v4().to_string();
  Ok(tp)
}

#[cfg(test)]
mod tests {
  use super::*;

  const EVAL_JSON: &str = r#"{
    "taskAchievement": { "score": 6.0, "feedback": "Covers the main trends." },
    "coherenceCohesion": { "score": 5.5, "feedback": "Mostly well organised." },
    "lexicalResource": { "score": 6.0, "feedback": "Adequate range." },
    "grammaticalRange": { "score": 5.5, "feedback": "Some errors." },
    "overallScore": 6.0,
    "generalFeedback": "A solid attempt."
  }"#;

  #[test]
  fn extraction_strategies_agree() {
    let raw = extract_json(EVAL_JSON).expect("raw");
    let fenced = extract_json(&format!("Here it is:\n```json\n{}\n```\nDone.", EVAL_JSON)).expect("fenced");
    let untagged_fence = extract_json(&format!("```\n{}\n```", EVAL_JSON)).expect("untagged fence");
    let prose = extract_json(&format!("Sure! The evaluation:\n{}\nHope this helps.", EVAL_JSON)).expect("prose");
    assert_eq!(raw, fenced);
    assert_eq!(raw, untagged_fence);
    assert_eq!(raw, prose);
  }

  #[test]
  fn extraction_fails_without_json() {
    assert!(extract_json("I could not evaluate this response.").is_err());
    assert!(extract_json("").is_err());
  }

  #[test]
  fn parse_evaluation_reads_all_criteria() {
    let eval = parse_evaluation(EVAL_JSON, WritingTask::Task1).expect("eval");
    assert_eq!(eval.task_criterion.score, 6.0);
    assert_eq!(eval.coherence_cohesion.score, 5.5);
    assert_eq!(eval.overall_score, 6.0);
    assert_eq!(eval.general_feedback, "A solid attempt.");
  }

  #[test]
  fn parse_evaluation_snaps_off_grid_scores() {
    let body = r#"{
      "taskResponse": { "score": 6.7, "feedback": "" },
      "coherenceCohesion": { "score": 0.2, "feedback": "" },
      "lexicalResource": { "score": 9.9, "feedback": "" },
      "grammaticalRange": { "score": 5.0, "feedback": "" },
      "overallScore": 6.7,
      "generalFeedback": ""
    }"#;
    let eval = parse_evaluation(body, WritingTask::Task2).expect("eval");
    assert_eq!(eval.task_criterion.score, 6.5);
    assert_eq!(eval.coherence_cohesion.score, 1.0);
    assert_eq!(eval.lexical_resource.score, 9.0);
    assert_eq!(eval.overall_score, 6.5);
  }

  #[test]
  fn parse_evaluation_requires_the_task_criterion_key() {
    // Task 2 output must use taskResponse, not taskAchievement.
    let err = parse_evaluation(EVAL_JSON, WritingTask::Task2).unwrap_err();
    assert!(matches!(err, ParseError::MissingField("taskResponse")));
  }

  #[test]
  fn parse_test_prompt_assigns_id_and_requires_chart_data() {
    let body = r#"{
      "task1": {
        "type": "bar-chart",
        "title": "Household spending",
        "description": "Spending by category",
        "chartData": { "labels": ["Food", "Rent"], "datasets": [{ "label": "2020", "data": [30, 40] }] },
        "prompt": "Summarize the chart. Write at least 150 words."
      },
      "task2": {
        "type": "discussion",
        "topic": "Urbanization",
        "prompt": "Discuss both views. Write at least 250 words."
      }
    }"#;
    let tp = parse_test_prompt(body).expect("test prompt");
    assert!(!tp.id.is_empty());
    assert_eq!(tp.task1.chart_data.as_ref().map(|c| c.labels.len()), Some(2));

    let missing_chart = body.replace(
      r#""chartData": { "labels": ["Food", "Rent"], "datasets": [{ "label": "2020", "data": [30, 40] }] },"#,
      "",
    );
    assert!(parse_test_prompt(&missing_chart).is_err());
  }
}
