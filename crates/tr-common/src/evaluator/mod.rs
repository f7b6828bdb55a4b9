pub mod openai;

use async_trait::async_trait;

use crate::recommend::record::AiEvaluationScores;
use crate::{CandidateProfile, JobProfile};

pub use openai::{EvaluatorConfig, OpenAiEvaluator};

#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    #[error("evaluator configuration error: {0}")]
    Config(String),
    #[error("evaluator network error: {0}")]
    Network(String),
    #[error("evaluator api error: {0}")]
    Api(String),
    #[error("evaluator returned an unparsable result: {0}")]
    Parse(String),
}

/// What the external evaluator hands back for one candidate/job pair.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOutput {
    pub scores: AiEvaluationScores,
    pub narrative: String,
}

/// Black-box AI evaluator. The core depends only on this input/output shape.
#[async_trait]
pub trait AiEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        job_description: &str,
        candidate_description: &str,
    ) -> Result<EvaluationOutput, EvaluatorError>;
}

/// Structured plain-text job description fed to the evaluator.
pub fn describe_job(job: &JobProfile) -> String {
    format!(
        "Title: {}\nPositions: {}\nSkills: {}",
        job.title,
        job.position_tags.join(", "),
        job.skill_tags.join(", ")
    )
}

/// Structured plain-text candidate description fed to the evaluator.
pub fn describe_candidate(candidate: &CandidateProfile) -> String {
    format!(
        "Name: {}\nPositions: {}\nSkills: {}\nExperience: {}\nDesired rate: {}",
        candidate.display_name,
        candidate.position_tags.join(", "),
        candidate.skills_text,
        candidate.experience_text,
        candidate.desired_rate_text
    )
}
