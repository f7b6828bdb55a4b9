use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether the external AI evaluator has produced a result for this pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiRunStatus {
    #[default]
    NotRun,
    Done,
}

/// The six sub-scores plus overall score returned by the evaluator. Written
/// to a record only as a complete set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AiEvaluationScores {
    pub skill_fit: f64,
    pub experience_fit: f64,
    pub domain_fit: f64,
    pub communication: f64,
    pub growth_potential: f64,
    pub rate_fit: f64,
    pub overall: f64,
}

/// AI evaluation block on a recommendation record. Independent of the
/// computed score and the staff flag; score-only reconciliation runs must
/// leave it untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AiEvaluation {
    pub status: AiRunStatus,
    pub scores: AiEvaluationScores,
    pub result_text: String,
    pub executed_at: Option<DateTime<Utc>>,
}

impl AiEvaluation {
    pub fn completed(scores: AiEvaluationScores, result_text: String, at: DateTime<Utc>) -> Self {
        Self {
            status: AiRunStatus::Done,
            scores,
            result_text,
            executed_at: Some(at),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == AiRunStatus::Done
    }
}

/// The persisted per-(candidate, job) pairing. Uniquely addressed by
/// (candidate external id, job id); created on first match or first explicit
/// recommend action and updated in place forever after.
///
/// The staff flag travels the wire as a sentinel string; it is decoded to a
/// plain bool at the store-adapter boundary and stays a bool everywhere in
/// the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub record_id: i64,
    pub candidate_external_id: String,
    pub job_id: i64,
    pub score: i64,
    pub staff_recommend: bool,
    pub ai_evaluation: AiEvaluation,
    /// Set once at creation, never overwritten.
    pub created_at: DateTime<Utc>,
    /// Store-managed; bumped on every write.
    pub updated_at: DateTime<Utc>,
}

impl RecommendationRecord {
    pub fn new(
        record_id: i64,
        candidate_external_id: impl Into<String>,
        job_id: i64,
        score: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            record_id,
            candidate_external_id: candidate_external_id.into(),
            job_id,
            score,
            staff_recommend: false,
            ai_evaluation: AiEvaluation::default(),
            created_at,
            updated_at: created_at,
        }
    }
}
