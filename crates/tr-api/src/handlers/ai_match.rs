use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tr_common::recommend::{AiMatchOrchestrator, AiMatchOutcome};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct AiMatchRequest {
    pub candidate_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct AiMatchResponse {
    pub job_id: i64,
    pub outcomes: Vec<AiMatchOutcome>,
}

#[instrument(skip(state, _user, body), fields(batch = body.candidate_ids.len()))]
pub async fn run_ai_match(
    State(state): State<SharedState>,
    _user: AuthUser,
    Path(job_id): Path<i64>,
    Json(body): Json<AiMatchRequest>,
) -> Result<Json<AiMatchResponse>, ApiError> {
    let evaluator = state.evaluator.clone().ok_or_else(|| {
        ApiError::ServiceUnavailable("ai evaluator is not configured".into())
    })?;

    let job = state
        .profiles
        .fetch_job(job_id)
        .await
        .map_err(|err| ApiError::Store(err.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("job {job_id} not found")))?;

    let orchestrator = AiMatchOrchestrator::new(
        state.profiles.clone(),
        state.recommendations.clone(),
        evaluator,
        state.ai_match,
    );

    let outcomes = orchestrator.run_ai_match(&job, &body.candidate_ids).await?;

    Ok(Json(AiMatchResponse { job_id, outcomes }))
}
