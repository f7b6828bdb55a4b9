use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tr_common::notify::NotificationEntry;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Comma separated notification ids the client has already shown.
    pub seen: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub notifications: Vec<NotificationEntry>,
}

#[instrument(skip(state, _user, query))]
pub async fn feed(
    State(state): State<SharedState>,
    _user: AuthUser,
    Path(external_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>, ApiError> {
    let seen: HashSet<String> = query
        .seen
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    let notifications = state.notifications.notifications_for(&external_id, &seen).await?;

    Ok(Json(FeedResponse { notifications }))
}
