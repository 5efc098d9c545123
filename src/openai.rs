//! Minimal OpenAI client for our use-cases.
//!
//! We only call chat.completions: one high-temperature call to draft a new
//! test, one low-temperature call per task evaluation. Both return free-form
//! text; tolerant JSON extraction happens in `extract`, never here.
//! Calls are instrumented and log model names, latencies, and response sizes
//! (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short to avoid PII leaks.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{instrument, info, error};

use crate::config::Prompts;
use crate::domain::WritingTask;
use crate::util::fill_template;

// Generation wants variety between tests; evaluation wants consistency
// between submissions.
const GENERATE_TEMPERATURE: f32 = 0.9;
const GENERATE_MAX_TOKENS: u32 = 2000;
const EVALUATE_TEMPERATURE: f32 = 0.1;
const EVALUATE_MAX_TOKENS: u32 = 1500;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// One chat completion round-trip. Returns the raw message text.
  #[instrument(level = "info", skip(self, messages), fields(model = %self.model, message_count = messages.len()))]
  async fn chat(
    &self,
    messages: Vec<ChatMessageReq>,
    temperature: f32,
    max_tokens: u32,
  ) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages,
      temperature,
      max_tokens: Some(max_tokens),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "penmark-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or_else(|| body);
      return Err(format!("OpenAI HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.get(0)
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();

    Ok(text)
  }

  // --- High-level helpers (domain-specialized) ---

  /// Draft a fresh Task 1 + Task 2 pair. Returns the raw text blob;
  /// the caller runs it through `extract::parse_test_prompt`.
  #[instrument(level = "info", skip(self, prompts), fields(model = %self.model))]
  pub async fn generate_test(&self, prompts: &Prompts) -> Result<String, String> {
    let start = std::time::Instant::now();
    let result = self.chat(
      vec![
        ChatMessageReq::system(&prompts.generate_system),
        ChatMessageReq::text("user", &prompts.generate_user),
      ],
      GENERATE_TEMPERATURE,
      GENERATE_MAX_TOKENS,
    ).await;
    let elapsed = start.elapsed();

    match &result {
      Ok(text) => info!(?elapsed, response_len = text.len(), "Test draft received"),
      Err(e) => error!(?elapsed, error = %e, "Model call failed during test generation"),
    }
    result
  }

  /// Score one task submission. Builds the full rubric (persona + shared
  /// rules + the task-specific criterion key) and the user message; a Task 1
  /// image reference turns the user message multimodal so the evaluator can
  /// check described figures against the actual visual. Returns the raw text
  /// blob for `extract::parse_evaluation`.
  #[instrument(
    level = "info",
    skip(self, prompts, task_prompt, response),
    fields(task = task.number(), model = %self.model, response_len = response.len(), has_image = image_url.is_some())
  )]
  pub async fn evaluate_writing(
    &self,
    prompts: &Prompts,
    task: WritingTask,
    task_prompt: &str,
    response: &str,
    word_count: usize,
    image_url: Option<&str>,
  ) -> Result<String, String> {
    let persona = match task {
      WritingTask::Task1 => &prompts.eval_system_task1,
      WritingTask::Task2 => &prompts.eval_system_task2,
    };
    let rules = fill_template(&prompts.eval_rules_template, &[("criterion", task.criterion_key())]);
    let system = format!("{}\n\n{}", persona, rules);

    let words = word_count.to_string();
    let task_no = task.number().to_string();
    let user_message = match image_url {
      Some(url) => {
        let text = fill_template(
          &prompts.eval_user_image_template,
          &[("prompt", task_prompt), ("response", response), ("word_count", &words)],
        );
        ChatMessageReq::with_image("user", &text, url)
      }
      None => {
        let focus = match task {
          WritingTask::Task1 => "visual data task",
          WritingTask::Task2 => "essay question",
        };
        let text = fill_template(
          &prompts.eval_user_template,
          &[
            ("task", &task_no),
            ("prompt", task_prompt),
            ("response", response),
            ("word_count", &words),
            ("focus", focus),
          ],
        );
        ChatMessageReq::text("user", &text)
      }
    };

    let start = std::time::Instant::now();
    let result = self.chat(
      vec![ChatMessageReq::system(&system), user_message],
      EVALUATE_TEMPERATURE,
      EVALUATE_MAX_TOKENS,
    ).await;
    let elapsed = start.elapsed();

    match &result {
      Ok(text) => info!(?elapsed, response_len = text.len(), "Evaluation received"),
      Err(e) => error!(?elapsed, error = %e, "Model call failed during evaluation"),
    }
    result
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessageReq {
  role: String,
  content: MessageContent,
}

impl ChatMessageReq {
  fn system(content: &str) -> Self {
    Self::text("system", content)
  }

  fn text(role: &str, content: &str) -> Self {
    Self { role: role.into(), content: MessageContent::Text(content.into()) }
  }

  fn with_image(role: &str, text: &str, url: &str) -> Self {
    Self {
      role: role.into(),
      content: MessageContent::Parts(vec![
        ContentPart::Text { text: text.into() },
        ContentPart::ImageUrl { image_url: ImageUrl { url: url.into() } },
      ]),
    }
  }
}

/// Plain string for text-only messages, part array for text+image.
#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
  Text(String),
  Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
  Text { text: String },
  ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
  url: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
