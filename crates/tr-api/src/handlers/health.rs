use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::http::StatusCode;

use crate::SharedState;

pub async fn livez() -> &'static str {
    "ok"
}

/// Flips to 503 once shutdown starts so load balancers drain us first.
pub async fn readyz(State(state): State<SharedState>) -> Result<&'static str, StatusCode> {
    if state.readiness.load(Ordering::SeqCst) {
        Ok("ready")
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
