pub mod scoring;
pub mod selector;
pub mod weights;

pub use scoring::{score_candidate, MatchDetail, MatchResult, MatchSource};
pub use selector::select_top_matches;
pub use weights::ScoringWeights;
