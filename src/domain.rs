//! Domain models used by the backend: test prompts, band criteria,
//! per-task evaluations, and the aggregated test result.
//!
//! Wire names are camelCase to match what the SPA already stores and renders.

use serde::{Deserialize, Serialize};

/// The two IELTS Academic Writing sub-tasks. Task 1 describes a visual,
/// Task 2 is an essay; each is scored independently on four criteria.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WritingTask {
  Task1,
  Task2,
}

impl WritingTask {
  pub fn number(self) -> u8 {
    match self {
      WritingTask::Task1 => 1,
      WritingTask::Task2 => 2,
    }
  }

  /// JSON key of the task-specific first criterion in evaluator output.
  /// The other three criteria share their keys across both tasks.
  pub fn criterion_key(self) -> &'static str {
    match self {
      WritingTask::Task1 => "taskAchievement",
      WritingTask::Task2 => "taskResponse",
    }
  }

  /// Nominal minimum length per the exam rules. Quoted in feedback for
  /// under-length submissions; the hard evaluation floor is lower (50 words).
  pub fn min_words(self) -> usize {
    match self {
      WritingTask::Task1 => 150,
      WritingTask::Task2 => 250,
    }
  }
}

/// Visual type presented in Task 1.
/// Generated tests use the chart kinds; authored tests may use any of these
/// and carry an uploaded image instead of chart data.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskOneKind {
  LineChart,
  BarChart,
  PieChart,
  Table,
  Process,
  Map,
  Image,
}

/// Essay type presented in Task 2.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EssayKind {
  Opinion,
  Discussion,
  ProblemSolution,
  AdvantagesDisadvantages,
}

/// One renderable data series. The shape mirrors what chart libraries
/// consume directly, so the generator asks the evaluator for exactly this.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
  pub label: String,
  pub data: Vec<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub background_color: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub border_color: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub border_width: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartData {
  pub labels: Vec<String>,
  pub datasets: Vec<ChartSeries>,
}

/// Task 1 of a test: a visual plus the instructional prompt.
/// Exactly one of `chart_data` / `image_url` is meaningful: generated tests
/// carry chart data, authored tests carry an image reference.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOnePrompt {
  #[serde(rename = "type")]
  pub kind: TaskOneKind,
  pub title: String,
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub chart_data: Option<ChartData>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
  pub prompt: String,
}

/// Task 2 of a test: the essay question.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskTwoPrompt {
  #[serde(rename = "type")]
  pub kind: EssayKind,
  pub topic: String,
  pub prompt: String,
}

/// One generated or authored test instance. Created once per test session,
/// immutable afterwards; results reference it only by id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestPrompt {
  #[serde(default)]
  pub id: String,
  pub task1: TaskOnePrompt,
  pub task2: TaskTwoPrompt,
}

/// A teacher-authored test stored in the authored-test bank.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualTest {
  pub id: String,
  pub title: String,
  pub created_by: String,
  pub created_at: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub scheduled_date: Option<String>,
  pub is_active: bool,
  pub task1: TaskOnePrompt,
  pub task2: TaskTwoPrompt,
}

/// Where a completed test came from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TestSource {
  AiGenerated,
  Manual,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TestStatus {
  Completed,
  InProgress,
  Abandoned,
}

/// Score + feedback for one marking criterion. Scores sit on the half-band
/// grid (see `band`), except the all-zero evaluation for empty submissions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationCriterion {
  pub score: f32,
  pub feedback: String,
}

/// Full evaluation of one task: the four criteria, the evaluator's stated
/// overall band, and free-text feedback. The first criterion is
/// Task Achievement (Task 1) or Task Response (Task 2).
#[derive(Clone, Debug)]
pub struct TaskEvaluation {
  pub task_criterion: EvaluationCriterion,
  pub coherence_cohesion: EvaluationCriterion,
  pub lexical_resource: EvaluationCriterion,
  pub grammatical_range: EvaluationCriterion,
  pub overall_score: f32,
  pub general_feedback: String,
}

/// Criterion breakdown stored with a Task 1 result.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task1Feedback {
  pub task_achievement: EvaluationCriterion,
  pub coherence_cohesion: EvaluationCriterion,
  pub lexical_resource: EvaluationCriterion,
  pub grammatical_range: EvaluationCriterion,
}

/// Criterion breakdown stored with a Task 2 result.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task2Feedback {
  pub task_response: EvaluationCriterion,
  pub coherence_cohesion: EvaluationCriterion,
  pub lexical_resource: EvaluationCriterion,
  pub grammatical_range: EvaluationCriterion,
}

impl TaskEvaluation {
  pub fn task1_feedback(&self) -> Task1Feedback {
    Task1Feedback {
      task_achievement: self.task_criterion.clone(),
      coherence_cohesion: self.coherence_cohesion.clone(),
      lexical_resource: self.lexical_resource.clone(),
      grammatical_range: self.grammatical_range.clone(),
    }
  }

  pub fn task2_feedback(&self) -> Task2Feedback {
    Task2Feedback {
      task_response: self.task_criterion.clone(),
      coherence_cohesion: self.coherence_cohesion.clone(),
      lexical_resource: self.lexical_resource.clone(),
      grammatical_range: self.grammatical_range.clone(),
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task1Result {
  pub prompt: String,
  pub response: String,
  pub score: f32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub chart_data: Option<ChartData>,
  pub feedback: Task1Feedback,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task2Result {
  pub prompt: String,
  pub response: String,
  pub score: f32,
  pub feedback: Task2Feedback,
}

/// One completed test, built exactly once per submission after both task
/// evaluations resolve. Invariant: `overall_score` is the mean of the two
/// task scores rounded to one decimal.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
  pub id: String,
  pub student_id: String,
  pub student_name: String,
  pub test_date: String,
  pub test_type: TestSource,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub test_id: Option<String>,
  pub task1: Task1Result,
  pub task2: Task2Result,
  pub overall_score: f32,
  pub time_spent: u64,
  pub status: TestStatus,
}
