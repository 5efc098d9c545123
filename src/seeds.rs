//! Built-in fallback content: the default test served when generation fails,
//! and the fixed evaluations produced without calling the evaluator.

use uuid::Uuid;

use crate::domain::{
  ChartData, ChartSeries, EssayKind, EvaluationCriterion, TaskEvaluation, TaskOneKind,
  TaskOnePrompt, TaskTwoPrompt, TestPrompt, WritingTask,
};

/// Deterministic default test. Served whenever generation is unavailable or
/// produces something unusable, so test setup never fails outright.
pub fn default_test_prompt() -> TestPrompt {
  TestPrompt {
    id: Uuid::new_v4().to_string(),
    task1: TaskOnePrompt {
      kind: TaskOneKind::LineChart,
      title: "Internet Users by Age Group (2010-2023)".into(),
      description: "The chart shows the percentage of internet users across different age groups over time".into(),
      chart_data: Some(ChartData {
        labels: vec!["2010".into(), "2015".into(), "2020".into(), "2023".into()],
        datasets: vec![
          ChartSeries {
            label: "18-29 years".into(),
            data: vec![85.0, 92.0, 96.0, 98.0],
            background_color: Some("rgba(37, 99, 235, 0.2)".into()),
            border_color: Some("rgba(37, 99, 235, 1)".into()),
            border_width: Some(2),
          },
          ChartSeries {
            label: "30-49 years".into(),
            data: vec![70.0, 82.0, 88.0, 92.0],
            background_color: Some("rgba(16, 163, 74, 0.2)".into()),
            border_color: Some("rgba(16, 163, 74, 1)".into()),
            border_width: Some(2),
          },
          ChartSeries {
            label: "50-64 years".into(),
            data: vec![45.0, 65.0, 75.0, 82.0],
            background_color: Some("rgba(249, 115, 22, 0.2)".into()),
            border_color: Some("rgba(249, 115, 22, 1)".into()),
            border_width: Some(2),
          },
        ],
      }),
      image_url: None,
      prompt: "You should spend about 20 minutes on this task. The line chart shows the percentage of internet users by age group from 2010 to 2023. Summarize the information by selecting and reporting the main features, and make comparisons where relevant. Write at least 150 words.".into(),
    },
    task2: TaskTwoPrompt {
      kind: EssayKind::Opinion,
      topic: "Technology and Education".into(),
      prompt: "You should spend about 40 minutes on this task. Some people believe that online learning is more effective than traditional classroom learning, while others argue that face-to-face instruction is irreplaceable. Discuss both views and give your own opinion. Write at least 250 words.".into(),
    },
  }
}

fn criterion(score: f32, feedback: &str) -> EvaluationCriterion {
  EvaluationCriterion { score, feedback: feedback.into() }
}

/// Fixed all-zero evaluation for an empty submission. Zero sits below the
/// band grid on purpose: nothing was assessed.
pub fn no_response_evaluation() -> TaskEvaluation {
  TaskEvaluation {
    task_criterion: criterion(0.0, "No response provided. Cannot evaluate empty submission."),
    coherence_cohesion: criterion(0.0, "No response to evaluate for coherence and cohesion."),
    lexical_resource: criterion(0.0, "No vocabulary usage to assess."),
    grammatical_range: criterion(0.0, "No grammatical structures to evaluate."),
    overall_score: 0.0,
    general_feedback: "No response submitted. Please provide a written response to receive evaluation.".into(),
  }
}

/// Fixed floor evaluation for a submission under the evaluation floor.
/// Feedback quotes the actual count against the task's nominal minimum.
pub fn short_response_evaluation(task: WritingTask, words: usize) -> TaskEvaluation {
  let min_words = task.min_words();
  TaskEvaluation {
    task_criterion: criterion(
      1.0,
      &format!("Response is too short ({} words). Minimum requirement is {} words.", words, min_words),
    ),
    coherence_cohesion: criterion(1.0, "Insufficient content to assess coherence and cohesion."),
    lexical_resource: criterion(1.0, "Limited vocabulary range due to very short response."),
    grammatical_range: criterion(1.0, "Insufficient content to assess grammatical range and accuracy."),
    overall_score: 1.0,
    general_feedback: format!(
      "Response is significantly under the word limit ({}/{} words). Please write a complete response.",
      words, min_words
    ),
  }
}

/// Fixed neutral evaluation substituted when the evaluator is unreachable or
/// returns something unusable. The student still gets a complete scorecard.
pub fn technical_error_evaluation() -> TaskEvaluation {
  TaskEvaluation {
    task_criterion: criterion(4.0, "Unable to evaluate due to technical error. Please try again."),
    coherence_cohesion: criterion(4.0, "Unable to evaluate due to technical error."),
    lexical_resource: criterion(4.0, "Unable to evaluate due to technical error."),
    grammatical_range: criterion(4.0, "Unable to evaluate due to technical error."),
    overall_score: 4.0,
    general_feedback: "Technical error occurred during evaluation. Please resubmit your response.".into(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_test_is_complete() {
    let tp = default_test_prompt();
    assert!(!tp.id.is_empty());
    let chart = tp.task1.chart_data.expect("chart data");
    assert!(!chart.labels.is_empty());
    assert_eq!(chart.datasets.len(), 3);
    assert!(!tp.task2.prompt.is_empty());
  }

  #[test]
  fn fixed_evaluations_use_the_expected_scores() {
    let none = no_response_evaluation();
    assert_eq!(none.overall_score, 0.0);
    assert_eq!(none.task_criterion.score, 0.0);

    let short = short_response_evaluation(WritingTask::Task2, 20);
    assert_eq!(short.overall_score, 1.0);
    assert!(short.task_criterion.feedback.contains("20 words"));
    assert!(short.general_feedback.contains("20/250"));

    let task1_short = short_response_evaluation(WritingTask::Task1, 30);
    assert!(task1_short.task_criterion.feedback.contains("150 words"));

    let err = technical_error_evaluation();
    assert_eq!(err.overall_score, 4.0);
    assert_eq!(err.grammatical_range.score, 4.0);
  }
}
