//! Public request/response DTOs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Domain values (`TestPrompt`, `ManualTest`, `TestResult`) already carry
//! their wire names and serialize directly; only the inbound shapes live here.

use serde::{Deserialize, Serialize};

use crate::domain::{ChartData, TaskOnePrompt, TaskTwoPrompt, TestSource};

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// Task 1 part of a submission: what was asked, what was written, and the
/// visual it was written about (image for authored tests, chart data for
/// generated ones).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task1SubmissionIn {
    pub prompt: String,
    pub response: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub chart_data: Option<ChartData>,
}

#[derive(Debug, Deserialize)]
pub struct Task2SubmissionIn {
    pub prompt: String,
    pub response: String,
}

/// A finished test session. Dates and elapsed time come from the UI's
/// clock/timer; the backend evaluates, aggregates, and persists.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestIn {
    pub student_id: String,
    pub student_name: String,
    pub test_date: String,
    pub test_type: TestSource,
    #[serde(default)]
    pub test_id: Option<String>,
    pub time_spent: u64,
    pub task1: Task1SubmissionIn,
    pub task2: Task2SubmissionIn,
}

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    #[serde(rename = "studentId")]
    pub student_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateManualTestIn {
    pub title: String,
    pub created_by: String,
    pub created_at: String,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub task1: TaskOnePrompt,
    pub task2: TaskTwoPrompt,
}

fn default_true() -> bool {
    true
}
