use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::evaluator::{describe_candidate, describe_job, AiEvaluator};
use crate::recommend::record::AiEvaluation;
use crate::recommend::reconcile::NewRecommendation;
use crate::store::{ProfileStore, RecommendationStore};
use crate::JobProfile;

#[derive(Debug, Clone, Copy)]
pub struct AiMatchConfig {
    /// Max evaluator calls in flight at once. Tunable, not a contract.
    pub concurrency: usize,
}

impl Default for AiMatchConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

impl AiMatchConfig {
    pub fn from_env() -> Self {
        Self {
            concurrency: std::env::var("TR_AI_MATCH_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(Self::default().concurrency),
        }
    }
}

/// Per-candidate result of an AI match batch, one per requested id, in
/// request order. Failures are data, not errors: one bad candidate never
/// aborts the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AiMatchOutcome {
    Evaluated {
        candidate_id: i64,
        record_id: i64,
        evaluation: AiEvaluation,
    },
    /// Candidate id did not resolve to a profile snapshot.
    MissingProfile { candidate_id: i64 },
    Failed { candidate_id: i64, error: String },
}

impl AiMatchOutcome {
    pub fn candidate_id(&self) -> i64 {
        match self {
            AiMatchOutcome::Evaluated { candidate_id, .. }
            | AiMatchOutcome::MissingProfile { candidate_id }
            | AiMatchOutcome::Failed { candidate_id, .. } => *candidate_id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiMatchError {
    #[error("candidate id batch is empty")]
    EmptyBatch,
}

/// Runs the external evaluator for an explicit candidate subset and upserts
/// the full AI-evaluation block per (candidate, job) pair, independent of
/// score reconciliation.
pub struct AiMatchOrchestrator {
    profiles: Arc<dyn ProfileStore>,
    recommendations: Arc<dyn RecommendationStore>,
    evaluator: Arc<dyn AiEvaluator>,
    config: AiMatchConfig,
}

impl AiMatchOrchestrator {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        recommendations: Arc<dyn RecommendationStore>,
        evaluator: Arc<dyn AiEvaluator>,
        config: AiMatchConfig,
    ) -> Self {
        Self {
            profiles,
            recommendations,
            evaluator,
            config,
        }
    }

    #[instrument(skip(self, job), fields(job_id = job.id, batch = candidate_ids.len()))]
    pub async fn run_ai_match(
        &self,
        job: &JobProfile,
        candidate_ids: &[i64],
    ) -> Result<Vec<AiMatchOutcome>, AiMatchError> {
        if candidate_ids.is_empty() {
            return Err(AiMatchError::EmptyBatch);
        }

        let job_description = describe_job(job);

        // `buffered` keeps output in input order while bounding how many
        // evaluator calls run concurrently.
        let outcomes = stream::iter(candidate_ids.iter().copied())
            .map(|candidate_id| self.evaluate_one(job, &job_description, candidate_id))
            .buffered(self.config.concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(outcomes)
    }

    async fn evaluate_one(
        &self,
        job: &JobProfile,
        job_description: &str,
        candidate_id: i64,
    ) -> AiMatchOutcome {
        let candidate = match self.profiles.fetch_candidate(candidate_id).await {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return AiMatchOutcome::MissingProfile { candidate_id },
            Err(err) => {
                warn!(candidate_id, error = %err, "profile fetch failed during ai match");
                return AiMatchOutcome::Failed {
                    candidate_id,
                    error: err.to_string(),
                };
            }
        };

        let output = match self
            .evaluator
            .evaluate(job_description, &describe_candidate(&candidate))
            .await
        {
            Ok(output) => output,
            Err(err) => {
                warn!(candidate_id, error = %err, "evaluator call failed");
                return AiMatchOutcome::Failed {
                    candidate_id,
                    error: err.to_string(),
                };
            }
        };

        let evaluation = AiEvaluation::completed(output.scores, output.narrative, Utc::now());

        match self
            .upsert_evaluation(&candidate.external_id, job.id, &evaluation)
            .await
        {
            Ok(record_id) => AiMatchOutcome::Evaluated {
                candidate_id,
                record_id,
                evaluation,
            },
            Err(err) => {
                warn!(candidate_id, error = %err, "ai evaluation write failed");
                AiMatchOutcome::Failed {
                    candidate_id,
                    error: err,
                }
            }
        }
    }

    /// Create-or-update by (candidate, job): the evaluation block is written
    /// as one unit; score and staff flag are never touched on update, and a
    /// newly created record keeps the default score.
    async fn upsert_evaluation(
        &self,
        candidate_external_id: &str,
        job_id: i64,
        evaluation: &AiEvaluation,
    ) -> Result<i64, String> {
        let record_id = match self
            .recommendations
            .find_pair(candidate_external_id, job_id)
            .await
            .map_err(|err| err.to_string())?
        {
            Some(record) => record.record_id,
            None => {
                let ids = self
                    .recommendations
                    .bulk_create(&[NewRecommendation {
                        candidate_external_id: candidate_external_id.to_string(),
                        job_id,
                        score: 0,
                    }])
                    .await
                    .map_err(|err| err.to_string())?;
                ids.first()
                    .copied()
                    .ok_or_else(|| "store returned no id for created record".to_string())?
            }
        };

        self.recommendations
            .write_ai_evaluation(record_id, evaluation)
            .await
            .map_err(|err| err.to_string())?;

        Ok(record_id)
    }
}
