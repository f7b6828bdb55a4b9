use serde::{Deserialize, Serialize};

use super::weights::ScoringWeights;
use crate::{CandidateProfile, JobProfile};

/// Candidate text sources searched for job keywords, in fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    PositionTag,
    SkillsText,
    ExperienceText,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSource::PositionTag => "position_tag",
            MatchSource::SkillsText => "skills_text",
            MatchSource::ExperienceText => "experience_text",
        }
    }
}

/// One matched job keyword with where it was found and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub keyword: String,
    /// Raw occurrence count summed across all matching sources (uncapped).
    pub count: u32,
    pub sources: Vec<MatchSource>,
}

/// Ephemeral affinity between one candidate and one job. Never persisted as
/// is; the reconciler folds it into recommendation records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: i64,
    pub candidate_external_id: String,
    pub candidate_name: String,
    pub job_id: i64,
    pub job_title: String,
    pub score: i64,
    pub details: Vec<MatchDetail>,
}

/// Keyword-overlap scoring. Deterministic, case-sensitive, and total: empty
/// keyword sets and empty candidate fields score 0 rather than erroring.
pub fn score_candidate(
    candidate: &CandidateProfile,
    job: &JobProfile,
    weights: &ScoringWeights,
) -> MatchResult {
    let mut details = Vec::new();
    let mut total: i64 = 0;

    for keyword in job.keywords() {
        let mut sources = Vec::new();
        let mut count: u32 = 0;
        let mut contribution: i64 = 0;

        // Position tags are exact matches, not substrings; a hit counts once.
        if candidate.position_tags.iter().any(|tag| tag == keyword) {
            sources.push(MatchSource::PositionTag);
            count += 1;
            contribution += i64::from(weights.position_tag);
        }

        let skills_hits = count_occurrences(&candidate.skills_text, keyword);
        if skills_hits > 0 {
            sources.push(MatchSource::SkillsText);
            count += skills_hits;
            contribution +=
                i64::from(weights.skills_text) * i64::from(skills_hits.min(weights.occurrence_cap));
        }

        let experience_hits = count_occurrences(&candidate.experience_text, keyword);
        if experience_hits > 0 {
            sources.push(MatchSource::ExperienceText);
            count += experience_hits;
            contribution += i64::from(weights.experience_text)
                * i64::from(experience_hits.min(weights.occurrence_cap));
        }

        if sources.is_empty() {
            continue;
        }

        total += contribution;
        details.push(MatchDetail {
            keyword: keyword.to_string(),
            count,
            sources,
        });
    }

    MatchResult {
        candidate_id: candidate.id,
        candidate_external_id: candidate.external_id.clone(),
        candidate_name: candidate.display_name.clone(),
        job_id: job.id,
        job_title: job.title.clone(),
        score: total,
        details,
    }
}

/// Non-overlapping case-sensitive substring occurrences.
fn count_occurrences(haystack: &str, needle: &str) -> u32 {
    if needle.is_empty() || haystack.is_empty() {
        return 0;
    }
    haystack.matches(needle).count() as u32
}
