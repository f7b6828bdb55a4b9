use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::matching::MatchResult;
use crate::store::{RecommendationStore, RecommendationStoreError};

/// Create instruction for a pair with no existing recommendation record.
/// Only the initial score is carried; the staff flag stays at its default
/// empty state and the AI block stays unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecommendation {
    pub candidate_external_id: String,
    pub job_id: i64,
    pub score: i64,
}

/// Score-only update for an existing record, addressed by record id. Must
/// never carry the staff flag or AI block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub record_id: i64,
    pub score: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub creates: Vec<NewRecommendation>,
    pub updates: Vec<ScoreUpdate>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("recommendation store error: {0}")]
    Store(#[from] RecommendationStoreError),
}

/// Split fresh match results into create and update instructions against the
/// current store snapshot. Pure: no I/O, no clock.
///
/// `existing_by_candidate` maps candidate external id to the record id of an
/// already-persisted recommendation for this job. A pair listed there always
/// becomes an update, never a second create. Duplicate candidates in the
/// match input collapse to their first (highest-ranked) entry.
pub fn plan_reconciliation(
    matches: &[MatchResult],
    existing_by_candidate: &HashMap<String, i64>,
) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for result in matches {
        if !seen.insert(result.candidate_external_id.as_str()) {
            continue;
        }

        match existing_by_candidate.get(&result.candidate_external_id) {
            Some(&record_id) => plan.updates.push(ScoreUpdate {
                record_id,
                score: result.score,
            }),
            None => plan.creates.push(NewRecommendation {
                candidate_external_id: result.candidate_external_id.clone(),
                job_id: result.job_id,
                score: result.score,
            }),
        }
    }

    plan
}

/// Submit a plan to the store as two bulk writes. A failure in either batch
/// surfaces as a single error; retrying the whole batch is the caller's call
/// (a retried create batch is absorbed by the store's pair-uniqueness
/// upsert, a retried update batch rewrites the same scores).
#[instrument(skip(store, plan), fields(creates = plan.creates.len(), updates = plan.updates.len()))]
pub async fn apply_plan(
    store: &dyn RecommendationStore,
    plan: &ReconcilePlan,
) -> Result<(), ReconcileError> {
    if !plan.creates.is_empty() {
        store.bulk_create(&plan.creates).await?;
    }

    if !plan.updates.is_empty() {
        store.bulk_update_scores(&plan.updates).await?;
    }

    debug!("reconciliation plan applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_result(external_id: &str, job_id: i64, score: i64) -> MatchResult {
        MatchResult {
            candidate_id: 1,
            candidate_external_id: external_id.into(),
            candidate_name: "Candidate".into(),
            job_id,
            job_title: "Job".into(),
            score,
            details: vec![],
        }
    }

    #[test]
    fn splits_matches_into_creates_and_updates() {
        let matches = vec![
            match_result("acct-1", 10, 8),
            match_result("acct-2", 10, 5),
        ];
        let existing = HashMap::from([("acct-2".to_string(), 77_i64)]);

        let plan = plan_reconciliation(&matches, &existing);

        assert_eq!(plan.creates.len(), 1);
        assert_eq!(plan.creates[0].candidate_external_id, "acct-1");
        assert_eq!(plan.creates[0].score, 8);

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(
            plan.updates[0],
            ScoreUpdate {
                record_id: 77,
                score: 5
            }
        );
    }

    #[test]
    fn existing_pairs_never_become_creates() {
        let matches = vec![match_result("acct-1", 10, 8)];
        let existing = HashMap::from([("acct-1".to_string(), 5_i64)]);

        let plan = plan_reconciliation(&matches, &existing);

        assert!(plan.creates.is_empty());
        assert_eq!(plan.updates.len(), 1);
    }

    #[test]
    fn duplicate_candidates_collapse_to_first_entry() {
        let matches = vec![
            match_result("acct-1", 10, 8),
            match_result("acct-1", 10, 3),
        ];

        let plan = plan_reconciliation(&matches, &HashMap::new());

        assert_eq!(plan.creates.len(), 1);
        assert_eq!(plan.creates[0].score, 8);
    }

    #[test]
    fn replanning_after_apply_is_a_noop() {
        let matches = vec![
            match_result("acct-1", 10, 8),
            match_result("acct-2", 10, 5),
        ];

        let first = plan_reconciliation(&matches, &HashMap::new());
        assert_eq!(first.creates.len(), 2);

        // Simulate the store state left by applying the first plan.
        let existing = HashMap::from([
            ("acct-1".to_string(), 1_i64),
            ("acct-2".to_string(), 2_i64),
        ]);

        let second = plan_reconciliation(&matches, &existing);
        assert!(second.creates.is_empty());
        assert_eq!(second.updates.len(), 2);
        assert_eq!(second.updates[0].score, 8);
        assert_eq!(second.updates[1].score, 5);
    }

    #[test]
    fn empty_matches_produce_empty_plan() {
        let plan = plan_reconciliation(&[], &HashMap::new());
        assert!(plan.is_empty());
    }
}
