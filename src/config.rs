//! Loading exam configuration (prompts + optional authored-test bank) from TOML.
//!
//! See `ExamConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{info, error};

use crate::domain::{TaskOnePrompt, TaskTwoPrompt};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ExamConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub tests: Vec<ManualTestCfg>,
}

/// Authored-test entry accepted in TOML configuration.
/// Task 1 of an authored test normally references an uploaded image
/// (`image_url`) rather than chart data.
#[derive(Clone, Debug, Deserialize)]
pub struct ManualTestCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub created_by: Option<String>,
  #[serde(default)] pub created_at: Option<String>,
  #[serde(default)] pub scheduled_date: Option<String>,
  #[serde(default)] pub is_active: Option<bool>,
  pub task1: TaskOnePrompt,
  pub task2: TaskTwoPrompt,
}

/// Prompts used by the OpenAI client. Defaults encode the grading contract:
/// relevance before fluency, the closed half-band score set, and a realistic
/// band distribution. Override in TOML only to tune tone/structure; the
/// scoring constraints should stay.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  // Test generation
  pub generate_system: String,
  pub generate_user: String,
  // Evaluation: per-task examiner persona
  pub eval_system_task1: String,
  pub eval_system_task2: String,
  // Evaluation: shared rules + required output shape ({criterion} placeholder)
  pub eval_rules_template: String,
  // Evaluation: user message bodies
  pub eval_user_template: String,
  pub eval_user_image_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      generate_system: r#"Generate a unique IELTS Academic Writing test with Task 1 and Task 2.

For Task 1: Create a data visualization task with specific chart data that can be used to generate charts. Include chart type (line-chart, bar-chart, pie-chart), title, data points, and a detailed prompt.

For Task 2: Create an essay question on current topics like technology, education, environment, society, etc.

Return the response in this exact JSON format:
{
  "task1": {
    "type": "line-chart|bar-chart|pie-chart",
    "title": "Chart title",
    "description": "Brief description of what the chart shows",
    "chartData": {
      "labels": ["Label1", "Label2", "Label3"],
      "datasets": [
        {
          "label": "Dataset name",
          "data": [value1, value2, value3],
          "backgroundColor": "color",
          "borderColor": "color"
        }
      ]
    },
    "prompt": "You should spend about 20 minutes on this task. [Detailed prompt describing what to analyze]"
  },
  "task2": {
    "type": "opinion|discussion|problem-solution|advantages-disadvantages",
    "topic": "Topic area",
    "prompt": "You should spend about 40 minutes on this task. [Detailed essay question] Write at least 250 words."
  }
}"#.into(),
      generate_user: "Generate one new test now. Respond with the JSON object only.".into(),
      eval_system_task1: r#"You are an expert IELTS Academic examiner with 20+ years of experience. Evaluate this IELTS Academic Writing Task 1 response according to official IELTS standards.

CRITICAL EVALUATION PRIORITY:
1. RELEVANCE CHECK FIRST: Does the response describe the EXACT visual data shown?
2. DATA ACCURACY: Are the figures, trends, and comparisons mentioned correct?
3. If response is about different data or completely wrong visual = Band 1-2 MAXIMUM
4. If response is irrelevant to the task = Band 1-2 MAXIMUM

IMPORTANT: Use ONLY valid IELTS band scores: 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0, 5.5, 6.0, 6.5, 7.0, 7.5, 8.0, 8.5, 9.0
NO other decimal scores are allowed (like 5.3, 6.7, etc.)

STRICT IELTS STANDARDS - Most responses should be Band 4-6:
- Band 9: Perfect response with expert analysis (very rare)
- Band 8: Excellent with minor issues (rare)
- Band 7: Good response with clear analysis (uncommon)
- Band 6: Adequate response with some issues (common)
- Band 5: Limited response with problems (common)
- Band 4: Basic response with major issues (common)
- Band 3: Poor response with serious problems
- Band 2: Very poor, barely understandable
- Band 1: Extremely poor or irrelevant

TASK ACHIEVEMENT EVALUATION:
- Must describe the EXACT visual data shown
- Must identify correct trends and patterns
- Must use accurate data from the visual
- Must provide appropriate overview
- WRONG DATA = Band 1-2 regardless of language quality"#.into(),
      eval_system_task2: r#"You are an expert IELTS Academic examiner with 20+ years of experience. Evaluate this IELTS Academic Writing Task 2 response according to official IELTS standards.

CRITICAL EVALUATION PRIORITY:
1. RELEVANCE CHECK FIRST: Does the response address the EXACT essay question asked?
2. TOPIC ADHERENCE: Is the content relevant to the specific topic?
3. If response is off-topic or irrelevant = Band 1-2 MAXIMUM
4. If response doesn't answer the question = Band 1-2 MAXIMUM

IMPORTANT: Use ONLY valid IELTS band scores: 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0, 5.5, 6.0, 6.5, 7.0, 7.5, 8.0, 8.5, 9.0
NO other decimal scores are allowed (like 5.3, 6.7, etc.)

STRICT IELTS STANDARDS - Most responses should be Band 4-6:
- Band 9: Perfect essay with expert argumentation (very rare)
- Band 8: Excellent with sophisticated ideas (rare)
- Band 7: Good essay with clear position (uncommon)
- Band 6: Adequate essay with relevant ideas (common)
- Band 5: Limited essay with basic ideas (common)
- Band 4: Basic essay with simple ideas (common)
- Band 3: Poor essay with unclear ideas
- Band 2: Very poor, difficult to follow
- Band 1: Extremely poor or irrelevant

TASK RESPONSE EVALUATION:
- Must directly answer the specific question
- Must stay on the given topic
- Must present relevant ideas and examples
- Must have clear position (if required)
- OFF-TOPIC = Band 1-2 regardless of language quality"#.into(),
      eval_rules_template: r#"MANDATORY EVALUATION RULES:
1. CHECK RELEVANCE FIRST: Is the content relevant to the task/question?
2. IRRELEVANT CONTENT = Band 1-2 MAXIMUM (even with perfect grammar)
3. WRONG VISUAL DATA = Band 1-2 MAXIMUM (Task 1)
4. OFF-TOPIC ESSAY = Band 1-2 MAXIMUM (Task 2)
5. Use ONLY valid IELTS bands: 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0, 5.5, 6.0, 6.5, 7.0, 7.5, 8.0, 8.5, 9.0
6. Most responses should be Band 4-6 (be realistic)
7. Band 7+ only for genuinely good responses
8. CONTENT RELEVANCE overrides language quality

Return your evaluation in this exact JSON format (no additional text):
{
  "{criterion}": { "score": 5.5, "feedback": "Detailed feedback..." },
  "coherenceCohesion": { "score": 5.0, "feedback": "Detailed feedback..." },
  "lexicalResource": { "score": 5.5, "feedback": "Detailed feedback..." },
  "grammaticalRange": { "score": 5.0, "feedback": "Detailed feedback..." },
  "overallScore": 5.0,
  "generalFeedback": "Overall assessment and suggestions for improvement..."
}"#.into(),
      eval_user_template: r#"TASK {task} EVALUATION - RELEVANCE CHECK

Task Prompt: {prompt}

Student Response ({word_count} words): {response}

EVALUATION PRIORITY ORDER:
1. RELEVANCE CHECK: Does the response address the specific {focus}?
2. CONTENT ACCURACY: Is the content appropriate and on-topic?
3. LANGUAGE ASSESSMENT: Evaluate grammar, vocabulary, coherence only if content is relevant

CRITICAL RULES:
- Off-topic response = Band 1-2 MAXIMUM
- Irrelevant content = Band 1-2 MAXIMUM
- Wrong task interpretation = Band 1-2 MAXIMUM
- Perfect language cannot save irrelevant content
- Most responses should be Band 4-6 (be realistic)

Evaluate strictly according to IELTS Academic standards with content relevance as priority."#.into(),
      eval_user_image_template: r#"TASK 1 EVALUATION - CRITICAL VISUAL DATA ANALYSIS

Task Prompt: {prompt}

Student Response ({word_count} words): {response}

EVALUATION PRIORITY ORDER:
1. EXAMINE THE IMAGE: What exactly does the visual data show?
2. RELEVANCE CHECK: Does the student's response describe THIS specific visual data?
3. ACCURACY CHECK: Are the figures, trends, and patterns mentioned correct?
4. COMPLETENESS: Are key features identified and compared?

CRITICAL RULES:
- If response describes different data = Band 1-2 MAXIMUM
- If response has wrong figures/trends = Band 1-3 MAXIMUM
- If response is irrelevant to image = Band 1-2 MAXIMUM
- Perfect grammar cannot save irrelevant content
- Only responses about THIS image can score well

Evaluate strictly based on how accurately the response describes the PROVIDED visual data."#.into(),
    }
  }
}

/// Attempt to load `ExamConfig` from EXAM_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_exam_config_from_env() -> Option<ExamConfig> {
  let path = std::env::var("EXAM_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<ExamConfig>(&s) {
      Ok(cfg) => {
        info!(target: "penmark_backend", %path, "Loaded exam config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "penmark_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "penmark_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
