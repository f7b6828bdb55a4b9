use std::cmp::Ordering;

use super::scoring::{score_candidate, MatchResult};
use super::weights::ScoringWeights;
use crate::{CandidateProfile, JobProfile};

/// Score every candidate against one job and keep the top `n` by score.
///
/// The sort is stable: equal scores keep the original candidate input order,
/// so the ranking is deterministic no matter how the scoring work is batched.
/// Zero scores are not filtered here; callers decide whether to drop them.
pub fn select_top_matches(
    candidates: &[CandidateProfile],
    job: &JobProfile,
    n: usize,
    weights: &ScoringWeights,
) -> Vec<MatchResult> {
    let mut results: Vec<MatchResult> = candidates
        .iter()
        .map(|candidate| score_candidate(candidate, job, weights))
        .collect();

    results.sort_by(|a, b| match b.score.cmp(&a.score) {
        Ordering::Equal => Ordering::Equal,
        other => other,
    });

    results.truncate(n);
    results
}
