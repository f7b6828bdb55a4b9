use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tr_common::matching::MatchResult;
use tr_common::pipeline::run_match_for_job;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    /// Overrides the configured shortlist size for this run.
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MatchRunResponse {
    pub job_id: i64,
    pub matched: usize,
    pub matches: Vec<MatchResult>,
}

#[instrument(skip(state, _user))]
pub async fn run_match(
    State(state): State<SharedState>,
    _user: AuthUser,
    Path(job_id): Path<i64>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<MatchRunResponse>, ApiError> {
    let mut config = state.pipeline;
    if let Some(limit) = query.limit.filter(|limit| *limit > 0) {
        config.shortlist_limit = limit;
    }

    let matches = run_match_for_job(
        state.profiles.as_ref(),
        state.recommendations.as_ref(),
        job_id,
        &config,
    )
    .await?;

    Ok(Json(MatchRunResponse {
        job_id,
        matched: matches.len(),
        matches,
    }))
}
