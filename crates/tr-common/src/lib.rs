pub mod evaluator;
pub mod logging;
pub mod matching;
pub mod notify;
pub mod pipeline;
pub mod recommend;
pub mod store;

// Immutable profile snapshots consumed by the matching functions. Both are
// fetched once per run from the profile store and never written back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateProfile {
    pub id: i64,
    /// Stable external-account id; recommendation records key on this.
    pub external_id: String,
    pub display_name: String,
    pub position_tags: Vec<String>,
    /// Free-text skills field. Absent fields are stored as empty strings.
    pub skills_text: String,
    /// Free-text experience narrative.
    pub experience_text: String,
    pub desired_rate_text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobProfile {
    pub id: i64,
    pub title: String,
    pub position_tags: Vec<String>,
    pub skill_tags: Vec<String>,
}

impl JobProfile {
    /// Union of position and skill tags, first occurrence wins, order kept.
    /// Tags are compared exactly as stored (case-sensitive).
    pub fn keywords(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.position_tags
            .iter()
            .chain(self.skill_tags.iter())
            .map(|tag| tag.as_str())
            .filter(|tag| !tag.is_empty() && seen.insert(*tag))
            .collect()
    }
}
