/// Default source weights for keyword-overlap scoring.
/// Position-tag hits outrank free-text hits; the per-source occurrence cap
/// keeps keyword stuffing in long narratives from dominating the ranking.
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    position_tag: 3,
    skills_text: 2,
    experience_text: 1,
    occurrence_cap: 5,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    pub position_tag: u32,
    pub skills_text: u32,
    pub experience_text: u32,
    /// Per-source occurrence count is clamped to this before weighting.
    pub occurrence_cap: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl ScoringWeights {
    /// Load weights from the environment, falling back to the defaults for
    /// anything missing or unparsable. The weights are tunables, not a fixed
    /// contract; relative order (position > skills > experience) is what the
    /// ranking behavior depends on.
    pub fn from_env() -> Self {
        Self {
            position_tag: env_u32("TR_WEIGHT_POSITION", DEFAULT_WEIGHTS.position_tag),
            skills_text: env_u32("TR_WEIGHT_SKILLS", DEFAULT_WEIGHTS.skills_text),
            experience_text: env_u32("TR_WEIGHT_EXPERIENCE", DEFAULT_WEIGHTS.experience_text),
            occurrence_cap: env_u32("TR_SCORE_CAP", DEFAULT_WEIGHTS.occurrence_cap),
        }
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_prefer_position_matches() {
        assert!(DEFAULT_WEIGHTS.position_tag > DEFAULT_WEIGHTS.skills_text);
        assert!(DEFAULT_WEIGHTS.skills_text > DEFAULT_WEIGHTS.experience_text);
        assert!(DEFAULT_WEIGHTS.occurrence_cap > 0);
    }
}
