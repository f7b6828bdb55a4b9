pub mod ai_match;
pub mod record;
pub mod reconcile;

pub use ai_match::{AiMatchConfig, AiMatchOrchestrator, AiMatchOutcome};
pub use record::{AiEvaluation, AiEvaluationScores, AiRunStatus, RecommendationRecord};
pub use reconcile::{apply_plan, plan_reconciliation, NewRecommendation, ReconcilePlan, ScoreUpdate};
