//! Training plan: asks the generative collaborator for one module per topic
//! and validates whatever comes back.
//!
//! The generator's output is never trusted: entries that fail the module
//! schema, carry a quiz answer outside its options, or reuse an id are
//! dropped. A plan that does not cover the requested topics one-to-one is
//! returned as *degraded* rather than failing.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::assessment::prompts::{training_plan_prompt, training_plan_schema, training_plan_system};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::training::TrainingModule;

/// Source of raw training-plan JSON.
///
/// Carried in `AppState` as `Option<Arc<dyn PlanGenerator>>`; `None` when no
/// credential is configured.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, topics: &[String]) -> Result<Value, AppError>;
}

/// Gemini-backed generator using a response schema for structured output.
pub struct GeminiPlanGenerator {
    llm: LlmClient,
}

impl GeminiPlanGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl PlanGenerator for GeminiPlanGenerator {
    async fn generate(&self, topics: &[String]) -> Result<Value, AppError> {
        let prompt = training_plan_prompt(topics);
        let schema = training_plan_schema();
        self.llm
            .call_json::<Value>(&prompt, &training_plan_system(), Some(&schema))
            .await
            .map_err(|e| AppError::ExternalService(format!("Training plan generation failed: {e}")))
    }
}

/// Validated result of a plan request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub modules: Vec<TrainingModule>,
    pub requested_topics: usize,
    /// True when the modules do not map one-to-one onto the requested topics.
    pub degraded: bool,
    pub warnings: Vec<String>,
}

/// Requests a plan for `topics`, bounded by `timeout`.
pub async fn request_training_plan(
    generator: Option<&dyn PlanGenerator>,
    topics: &[String],
    timeout: Duration,
) -> Result<PlanOutcome, AppError> {
    let generator = generator.ok_or_else(|| {
        AppError::Configuration("GEMINI_API_KEY is not set; training plans are disabled".into())
    })?;

    if topics.is_empty() {
        return Ok(PlanOutcome::default());
    }

    let raw = tokio::time::timeout(timeout, generator.generate(topics))
        .await
        .map_err(|_| {
            AppError::ExternalService(format!(
                "Training plan generation timed out after {}s",
                timeout.as_secs()
            ))
        })??;

    let outcome = validate_plan(topics, raw)?;
    if outcome.degraded {
        warn!(
            "Degraded training plan: {} module(s) for {} topic(s): {:?}",
            outcome.modules.len(),
            outcome.requested_topics,
            outcome.warnings
        );
    } else {
        info!("Training plan generated: {} module(s)", outcome.modules.len());
    }
    Ok(outcome)
}

/// Checks raw generator output. Only a non-array response is an error.
pub fn validate_plan(topics: &[String], raw: Value) -> Result<PlanOutcome, AppError> {
    let Value::Array(entries) = raw else {
        return Err(AppError::ExternalService(
            "Training plan response is not a JSON array".to_string(),
        ));
    };

    let mut modules: Vec<TrainingModule> = Vec::with_capacity(entries.len());
    let mut warnings = Vec::new();
    let mut dropped = 0usize;

    for (index, entry) in entries.into_iter().enumerate() {
        let module: TrainingModule = match serde_json::from_value(entry) {
            Ok(m) => m,
            Err(e) => {
                warnings.push(format!("entry {index} does not match the module schema: {e}"));
                dropped += 1;
                continue;
            }
        };

        if module.id.trim().is_empty() {
            warnings.push(format!("entry {index} has an empty id"));
            dropped += 1;
            continue;
        }

        if modules.iter().any(|m| m.id == module.id) {
            warnings.push(format!("duplicate module id '{}'", module.id));
            dropped += 1;
            continue;
        }

        if let Some(q) = module
            .quiz_questions
            .iter()
            .find(|q| !q.answer_is_an_option())
        {
            warnings.push(format!(
                "module '{}' has a quiz answer not among its options: '{}'",
                module.id, q.answer
            ));
            dropped += 1;
            continue;
        }

        if !topics.iter().any(|t| t == &module.topic) {
            warnings.push(format!(
                "module '{}' has unrequested topic '{}'",
                module.id, module.topic
            ));
        }

        modules.push(module);
    }

    let missing: Vec<&String> = topics
        .iter()
        .filter(|t| !modules.iter().any(|m| &m.topic == *t))
        .collect();
    for topic in &missing {
        warnings.push(format!("no module for topic '{topic}'"));
    }

    let degraded = dropped > 0 || !missing.is_empty() || modules.len() != topics.len();

    Ok(PlanOutcome {
        modules,
        requested_topics: topics.len(),
        degraded,
        warnings,
    })
}
