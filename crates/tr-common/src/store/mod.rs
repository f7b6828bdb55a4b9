pub mod memory;
pub mod pg;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::recommend::record::{AiEvaluation, RecommendationRecord};
use crate::recommend::reconcile::{NewRecommendation, ScoreUpdate};
use crate::{CandidateProfile, JobProfile};

pub use memory::{InMemoryProfileStore, InMemoryRecommendationStore};
pub use pg::{create_pool_from_url, DbPoolError, PgPool, PgProfileStore, PgRecommendationStore};

#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("failed to get store connection: {0}")]
    Connection(String),
    #[error("profile store query failed: {0}")]
    Query(String),
    #[error("failed to map profile row: {0}")]
    Mapping(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendationStoreError {
    #[error("failed to get store connection: {0}")]
    Connection(String),
    #[error("recommendation store query failed: {0}")]
    Query(String),
    #[error("bulk write failed: {0}")]
    BulkWrite(String),
    #[error("recommendation record not found: {0}")]
    NotFound(i64),
    #[error("failed to map recommendation row: {0}")]
    Mapping(String),
}

/// Read-only access to candidate and job snapshots. Implementations must
/// filter withdrawn/inactive candidates before they reach the scorer.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch_active_candidates(&self) -> Result<Vec<CandidateProfile>, ProfileStoreError>;

    async fn fetch_candidate(&self, id: i64) -> Result<Option<CandidateProfile>, ProfileStoreError>;

    async fn fetch_job(&self, job_id: i64) -> Result<Option<JobProfile>, ProfileStoreError>;

    /// Bulk title lookup for the notification feed. Ids without a title are
    /// simply absent from the map, never an error.
    async fn fetch_job_titles(
        &self,
        job_ids: &[i64],
    ) -> Result<HashMap<i64, String>, ProfileStoreError>;
}

/// Record-oriented recommendation storage keyed by (candidate external id,
/// job id). Score, staff flag and AI block are independently addressable;
/// none of these operations may clobber a field it does not name.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn fetch_by_job(
        &self,
        job_id: i64,
    ) -> Result<Vec<RecommendationRecord>, RecommendationStoreError>;

    /// Records for one candidate, most recently created first, bounded.
    async fn fetch_for_candidate(
        &self,
        candidate_external_id: &str,
        limit: usize,
    ) -> Result<Vec<RecommendationRecord>, RecommendationStoreError>;

    async fn find_pair(
        &self,
        candidate_external_id: &str,
        job_id: i64,
    ) -> Result<Option<RecommendationRecord>, RecommendationStoreError>;

    /// Bulk create; returns new record ids in input order. Creating an
    /// already-present pair updates its score instead of duplicating it.
    async fn bulk_create(
        &self,
        creates: &[NewRecommendation],
    ) -> Result<Vec<i64>, RecommendationStoreError>;

    /// Score-only bulk update by record id.
    async fn bulk_update_scores(
        &self,
        updates: &[ScoreUpdate],
    ) -> Result<(), RecommendationStoreError>;

    /// Replace the AI evaluation block of one record as a unit, leaving
    /// score and staff flag untouched.
    async fn write_ai_evaluation(
        &self,
        record_id: i64,
        evaluation: &AiEvaluation,
    ) -> Result<(), RecommendationStoreError>;
}

/// Existing record ids for one job keyed by candidate external id, the shape
/// the reconciliation planner consumes.
pub fn existing_ids_by_candidate(records: &[RecommendationRecord]) -> HashMap<String, i64> {
    records
        .iter()
        .map(|record| (record.candidate_external_id.clone(), record.record_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn indexes_records_by_candidate() {
        let records = vec![
            RecommendationRecord::new(1, "acct-1", 10, 5, Utc::now()),
            RecommendationRecord::new(2, "acct-2", 10, 3, Utc::now()),
        ];

        let index = existing_ids_by_candidate(&records);
        assert_eq!(index.get("acct-1"), Some(&1));
        assert_eq!(index.get("acct-2"), Some(&2));
        assert_eq!(index.len(), 2);
    }
}
