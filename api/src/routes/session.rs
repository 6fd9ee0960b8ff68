//! Session status endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use upkeep_core::SessionStatus;

use crate::{ApiResult, ApiState};

#[derive(Serialize)]
pub struct StatusResponse {
    as_of: String,
    uptime_secs: u64,
    #[serde(flatten)]
    session: SessionStatus,
}

/// Full snapshot of ledger, timer, and toggle state.
pub async fn get_status(State(state): State<ApiState>) -> ApiResult<Json<StatusResponse>> {
    let session = state.session.read().await;

    Ok(Json(StatusResponse {
        as_of: chrono::Utc::now().to_rfc3339(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        session: session.status(),
    }))
}
