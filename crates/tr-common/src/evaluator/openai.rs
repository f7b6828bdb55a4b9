//! OpenAI-compatible chat-completions evaluator. Any endpoint speaking the
//! same wire format (Azure, proxies, local gateways) works via
//! `TR_AI_ENDPOINT`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{AiEvaluator, EvaluationOutput, EvaluatorError};
use crate::recommend::record::AiEvaluationScores;

const SYSTEM_PROMPT: &str = "You are a recruiting analyst. Evaluate how well the \
candidate fits the job. Respond with a single JSON object and nothing else, with \
numeric fields skill_fit, experience_fit, domain_fit, communication, \
growth_potential, rate_fit, overall (each 0.0-5.0) and a string field narrative.";

#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".into(),
            model: "gpt-4o-mini".into(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl EvaluatorConfig {
    pub fn from_env() -> Self {
        fn parse_u64(key: &str, default: u64) -> u64 {
            std::env::var(key)
                .ok()
                .and_then(|raw| raw.parse::<u64>().ok())
                .unwrap_or(default)
        }

        let defaults = Self::default();
        Self {
            endpoint: std::env::var("TR_AI_ENDPOINT").unwrap_or(defaults.endpoint),
            model: std::env::var("TR_AI_MODEL").unwrap_or(defaults.model),
            api_key: std::env::var("TR_AI_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .unwrap_or_default(),
            timeout_secs: parse_u64("TR_AI_TIMEOUT_SECONDS", defaults.timeout_secs),
        }
    }
}

#[derive(Debug)]
pub struct OpenAiEvaluator {
    client: reqwest::Client,
    config: EvaluatorConfig,
}

impl OpenAiEvaluator {
    pub fn new(config: EvaluatorConfig) -> Result<Self, EvaluatorError> {
        if config.api_key.is_empty() {
            return Err(EvaluatorError::Config(
                "TR_AI_API_KEY (or OPENAI_API_KEY) is not set".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| EvaluatorError::Config(err.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, EvaluatorError> {
        Self::new(EvaluatorConfig::from_env())
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct EvaluationPayload {
    skill_fit: f64,
    experience_fit: f64,
    domain_fit: f64,
    communication: f64,
    growth_potential: f64,
    rate_fit: f64,
    overall: f64,
    narrative: String,
}

/// Parse the model's JSON reply into an evaluation. Tolerates code fences
/// some models wrap around JSON output.
fn parse_evaluation(content: &str) -> Result<EvaluationOutput, EvaluatorError> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let payload: EvaluationPayload =
        serde_json::from_str(trimmed).map_err(|err| EvaluatorError::Parse(err.to_string()))?;

    Ok(EvaluationOutput {
        scores: AiEvaluationScores {
            skill_fit: payload.skill_fit,
            experience_fit: payload.experience_fit,
            domain_fit: payload.domain_fit,
            communication: payload.communication,
            growth_potential: payload.growth_potential,
            rate_fit: payload.rate_fit,
            overall: payload.overall,
        },
        narrative: payload.narrative,
    })
}

#[async_trait]
impl AiEvaluator for OpenAiEvaluator {
    async fn evaluate(
        &self,
        job_description: &str,
        candidate_description: &str,
    ) -> Result<EvaluationOutput, EvaluatorError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!("JOB:\n{job_description}\n\nCANDIDATE:\n{candidate_description}"),
                },
            ],
            "temperature": 0.0,
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| EvaluatorError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EvaluatorError::Api(format!("{status}: {detail}")));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| EvaluatorError::Parse(err.to_string()))?;

        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| EvaluatorError::Parse("response contained no choices".into()))?;

        debug!(model = %self.config.model, "evaluator response received");
        parse_evaluation(content)
    }
}
