//! End-to-end match trigger: one job against all active candidates, top-N
//! shortlist, reconciled into the recommendation store. Fired by the
//! job-created webhook and by the operator extract action; both return the
//! shortlist for display. Delivery side effects are the caller's concern and
//! happen only after this returns.

use tracing::{info, instrument};

use crate::matching::{select_top_matches, MatchResult, ScoringWeights};
use crate::recommend::reconcile::{apply_plan, plan_reconciliation, ReconcileError};
use crate::store::{
    existing_ids_by_candidate, ProfileStore, ProfileStoreError, RecommendationStore,
    RecommendationStoreError,
};

#[derive(Debug, Clone, Copy)]
pub struct MatchPipelineConfig {
    /// Shortlist size per job.
    pub shortlist_limit: usize,
    pub weights: ScoringWeights,
}

impl Default for MatchPipelineConfig {
    fn default() -> Self {
        Self {
            shortlist_limit: 50,
            weights: ScoringWeights::default(),
        }
    }
}

impl MatchPipelineConfig {
    pub fn from_env() -> Self {
        Self {
            shortlist_limit: std::env::var("TR_MATCH_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(Self::default().shortlist_limit),
            weights: ScoringWeights::from_env(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatchPipelineError {
    #[error("job not found: {0}")]
    JobNotFound(i64),
    #[error("no active candidates to match")]
    NoActiveCandidates,
    #[error("profile store error: {0}")]
    Profiles(#[from] ProfileStoreError),
    #[error("recommendation store error: {0}")]
    Recommendations(#[from] RecommendationStoreError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

#[instrument(skip(profiles, recommendations, config))]
pub async fn run_match_for_job(
    profiles: &dyn ProfileStore,
    recommendations: &dyn RecommendationStore,
    job_id: i64,
    config: &MatchPipelineConfig,
) -> Result<Vec<MatchResult>, MatchPipelineError> {
    let job = profiles
        .fetch_job(job_id)
        .await?
        .ok_or(MatchPipelineError::JobNotFound(job_id))?;

    let candidates = profiles.fetch_active_candidates().await?;
    if candidates.is_empty() {
        return Err(MatchPipelineError::NoActiveCandidates);
    }

    let shortlist = select_top_matches(&candidates, &job, config.shortlist_limit, &config.weights);

    let existing = recommendations.fetch_by_job(job_id).await?;
    let plan = plan_reconciliation(&shortlist, &existing_ids_by_candidate(&existing));
    apply_plan(recommendations, &plan).await?;

    info!(
        job_id,
        candidates = candidates.len(),
        shortlist = shortlist.len(),
        creates = plan.creates.len(),
        updates = plan.updates.len(),
        "match pipeline completed"
    );

    Ok(shortlist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::store::{InMemoryProfileStore, InMemoryRecommendationStore};
    use crate::{CandidateProfile, JobProfile};

    fn candidate(id: i64, skills: &str) -> CandidateProfile {
        CandidateProfile {
            id,
            external_id: format!("acct-{id}"),
            display_name: format!("Candidate {id}"),
            skills_text: skills.into(),
            ..CandidateProfile::default()
        }
    }

    fn job() -> JobProfile {
        JobProfile {
            id: 1,
            title: "Rust Engineer".into(),
            skill_tags: vec!["Rust".into(), "AWS".into()],
            ..JobProfile::default()
        }
    }

    fn stores(
        candidates: Vec<CandidateProfile>,
    ) -> (Arc<InMemoryProfileStore>, Arc<InMemoryRecommendationStore>) {
        (
            Arc::new(InMemoryProfileStore::new(candidates, vec![job()])),
            Arc::new(InMemoryRecommendationStore::new()),
        )
    }

    #[tokio::test]
    async fn persists_shortlist_and_returns_it() {
        let (profiles, records) = stores(vec![
            candidate(1, "Rust AWS"),
            candidate(2, "Rust"),
            candidate(3, "Python"),
        ]);

        let shortlist = run_match_for_job(
            profiles.as_ref(),
            records.as_ref(),
            1,
            &MatchPipelineConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(shortlist.len(), 3);
        assert_eq!(shortlist[0].candidate_id, 1);
        assert_eq!(records.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn second_run_updates_instead_of_duplicating() {
        let (profiles, records) = stores(vec![candidate(1, "Rust")]);
        let config = MatchPipelineConfig::default();

        run_match_for_job(profiles.as_ref(), records.as_ref(), 1, &config)
            .await
            .unwrap();
        let after_first = records.snapshot();

        run_match_for_job(profiles.as_ref(), records.as_ref(), 1, &config)
            .await
            .unwrap();
        let after_second = records.snapshot();

        assert_eq!(after_first.len(), after_second.len());
        assert_eq!(after_first[0].record_id, after_second[0].record_id);
        assert_eq!(after_first[0].score, after_second[0].score);
        assert_eq!(after_first[0].created_at, after_second[0].created_at);
    }

    #[tokio::test]
    async fn unknown_job_fails_fast() {
        let (profiles, records) = stores(vec![candidate(1, "Rust")]);

        let err = run_match_for_job(
            profiles.as_ref(),
            records.as_ref(),
            999,
            &MatchPipelineConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MatchPipelineError::JobNotFound(999)));
        assert!(records.snapshot().is_empty());
    }

    #[tokio::test]
    async fn empty_candidate_pool_fails_fast() {
        let (profiles, records) = stores(vec![]);

        let err = run_match_for_job(
            profiles.as_ref(),
            records.as_ref(),
            1,
            &MatchPipelineConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MatchPipelineError::NoActiveCandidates));
    }

    #[tokio::test]
    async fn store_write_failure_surfaces_as_single_error() {
        let (profiles, records) = stores(vec![candidate(1, "Rust")]);
        records.set_fail_writes(true);

        let err = run_match_for_job(
            profiles.as_ref(),
            records.as_ref(),
            1,
            &MatchPipelineConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MatchPipelineError::Reconcile(_)));
    }

    #[tokio::test]
    async fn withdrawn_candidates_never_reach_scoring() {
        let (profiles, records) = stores(vec![candidate(1, "Rust"), candidate(2, "Rust")]);
        profiles.withdraw_candidate(2);

        let shortlist = run_match_for_job(
            profiles.as_ref(),
            records.as_ref(),
            1,
            &MatchPipelineConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(shortlist.len(), 1);
        assert_eq!(shortlist[0].candidate_id, 1);
    }
}
