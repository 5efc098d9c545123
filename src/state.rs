//! Application state: in-memory stores, prompts, and the OpenAI client.
//!
//! This module owns:
//!   - the result store (per-student lists of completed tests)
//!   - the authored-test store (teacher-authored tests, config-seeded or
//!     created at runtime)
//!   - the prompts struct (from TOML or defaults)
//!   - optional OpenAI client
//!
//! Test generation asks OpenAI for a fresh task pair when available and
//! falls back to the built-in default test, so a caller always gets a
//! usable prompt.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{load_exam_config_from_env, Prompts};
use crate::domain::{ManualTest, TestPrompt, TestResult};
use crate::extract;
use crate::openai::OpenAI;
use crate::seeds::default_test_prompt;

#[derive(Clone)]
pub struct AppState {
    pub results: Arc<RwLock<HashMap<String, Vec<TestResult>>>>,
    pub manual_tests: Arc<RwLock<HashMap<String, ManualTest>>>,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load config, seed authored tests, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        // Load TOML config if provided (prompts + optional authored-test bank).
        let cfg_opt = load_exam_config_from_env();
        let prompts = cfg_opt
            .as_ref()
            .map(|c| c.prompts.clone())
            .unwrap_or_default();

        let mut test_map = HashMap::<String, ManualTest>::new();

        if let Some(cfg) = &cfg_opt {
            for tc in &cfg.tests {
                let id = tc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());

                if tc.task1.prompt.trim().is_empty() || tc.task2.prompt.trim().is_empty() {
                    error!(target: "testgen", %id, title = %tc.title, "Skipping bank test: missing task prompt.");
                    continue;
                }
                if tc.task1.image_url.is_none() && tc.task1.chart_data.is_none() {
                    warn!(target: "testgen", %id, title = %tc.title, "Bank test has no Task 1 visual (image or chart).");
                }

                let mt = ManualTest {
                    id: id.clone(),
                    title: tc.title.clone(),
                    created_by: tc.created_by.clone().unwrap_or_else(|| "config".into()),
                    created_at: tc.created_at.clone().unwrap_or_default(),
                    scheduled_date: tc.scheduled_date.clone(),
                    is_active: tc.is_active.unwrap_or(true),
                    task1: tc.task1.clone(),
                    task2: tc.task2.clone(),
                };
                test_map.insert(id, mt);
            }
        }

        let active = test_map.values().filter(|t| t.is_active).count();
        info!(target: "testgen", total = test_map.len(), active, "Startup authored-test inventory");

        // Build optional OpenAI client (if API key present).
        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "penmark_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            info!(target: "penmark_backend", "OpenAI disabled (no OPENAI_API_KEY). Serving the built-in default test.");
        }

        Self {
            results: Arc::new(RwLock::new(HashMap::new())),
            manual_tests: Arc::new(RwLock::new(test_map)),
            openai,
            prompts,
        }
    }

    /// Test Generator: one OpenAI call, validated through the tolerant
    /// extraction chain; anything short of a usable test falls back to the
    /// built-in default. Returns the prompt plus its origin tag for logs.
    #[instrument(level = "info", skip(self))]
    pub async fn new_test_prompt(&self) -> (TestPrompt, &'static str) {
        if let Some(oa) = &self.openai {
            match oa.generate_test(&self.prompts).await {
                Ok(text) => match extract::parse_test_prompt(&text) {
                    Ok(tp) => {
                        info!(target: "testgen", id = %tp.id, source = "openai_generated", "Generated fresh test");
                        return (tp, "openai_generated");
                    }
                    Err(e) => {
                        error!(target: "testgen", error = %e, "Generated test failed validation; using default test");
                    }
                },
                Err(e) => {
                    error!(target: "testgen", error = %e, "OpenAI generation failed; using default test");
                }
            }
        } else {
            warn!(target: "testgen", "OPENAI_API_KEY not set; using default test");
        }

        let tp = default_test_prompt();
        info!(target: "testgen", id = %tp.id, source = "default", "Serving built-in default test");
        (tp, "default")
    }

    /// Insert an authored test into the store.
    #[instrument(level = "debug", skip(self, t), fields(id = %t.id))]
    pub async fn insert_manual_test(&self, t: ManualTest) {
        let mut tests = self.manual_tests.write().await;
        tests.insert(t.id.clone(), t);
    }

    /// Read-only access to an authored test by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_manual_test(&self, id: &str) -> Option<ManualTest> {
        let tests = self.manual_tests.read().await;
        tests.get(id).cloned()
    }

    /// Active authored tests, newest first.
    #[instrument(level = "debug", skip(self))]
    pub async fn active_manual_tests(&self) -> Vec<ManualTest> {
        let tests = self.manual_tests.read().await;
        let mut out: Vec<ManualTest> = tests.values().filter(|t| t.is_active).cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    /// Hand a completed result to the store. One call per completed test.
    #[instrument(level = "info", skip(self, result), fields(id = %result.id, student = %result.student_id))]
    pub async fn save_result(&self, result: TestResult) {
        let mut results = self.results.write().await;
        results.entry(result.student_id.clone()).or_default().push(result);
    }

    /// Completed tests for one student, newest first.
    #[instrument(level = "debug", skip(self), fields(%student_id))]
    pub async fn results_for_student(&self, student_id: &str) -> Vec<TestResult> {
        let results = self.results.read().await;
        let mut out = results.get(student_id).cloned().unwrap_or_default();
        out.sort_by(|a, b| b.test_date.cmp(&a.test_date));
        out
    }

    /// Every completed test, newest first. Used by the teacher view.
    #[instrument(level = "debug", skip(self))]
    pub async fn all_results(&self) -> Vec<TestResult> {
        let results = self.results.read().await;
        let mut out: Vec<TestResult> = results.values().flatten().cloned().collect();
        out.sort_by(|a, b| b.test_date.cmp(&a.test_date));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EssayKind, TaskOneKind, TaskOnePrompt, TaskTwoPrompt};

    fn offline_state() -> AppState {
        AppState {
            results: Arc::new(RwLock::new(HashMap::new())),
            manual_tests: Arc::new(RwLock::new(HashMap::new())),
            openai: None,
            prompts: Prompts::default(),
        }
    }

    fn authored(id: &str, active: bool, created_at: &str) -> ManualTest {
        ManualTest {
            id: id.into(),
            title: format!("Test {}", id),
            created_by: "t-1".into(),
            created_at: created_at.into(),
            scheduled_date: None,
            is_active: active,
            task1: TaskOnePrompt {
                kind: TaskOneKind::Image,
                title: "Rainfall map".into(),
                description: "Annual rainfall by region".into(),
                chart_data: None,
                image_url: Some("https://example.test/rainfall.png".into()),
                prompt: "Summarize the map. Write at least 150 words.".into(),
            },
            task2: TaskTwoPrompt {
                kind: EssayKind::ProblemSolution,
                topic: "Water scarcity".into(),
                prompt: "Suggest solutions. Write at least 250 words.".into(),
            },
        }
    }

    #[tokio::test]
    async fn generation_falls_back_to_the_default_test() {
        let state = offline_state();
        let (tp, origin) = state.new_test_prompt().await;
        assert_eq!(origin, "default");
        assert!(tp.task1.chart_data.as_ref().map_or(false, |c| !c.labels.is_empty()));
        assert!(!tp.task2.prompt.is_empty());
        // Two sessions never share a prompt id.
        let (tp2, _) = state.new_test_prompt().await;
        assert_ne!(tp.id, tp2.id);
    }

    #[tokio::test]
    async fn listing_returns_active_tests_newest_first() {
        let state = offline_state();
        state.insert_manual_test(authored("a", true, "2025-01-10T00:00:00Z")).await;
        state.insert_manual_test(authored("b", false, "2025-02-10T00:00:00Z")).await;
        state.insert_manual_test(authored("c", true, "2025-03-10T00:00:00Z")).await;

        let active = state.active_manual_tests().await;
        let ids: Vec<&str> = active.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);

        assert!(state.get_manual_test("b").await.is_some());
        assert!(state.get_manual_test("missing").await.is_none());
    }
}
