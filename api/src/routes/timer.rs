//! Phase timer endpoints

use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use upkeep_core::TimerSnapshot;

use crate::{ApiError, ApiResult, ApiState};

/// Register timer routes
pub fn timer_routes() -> Router<ApiState> {
    Router::new().route("/reset", post(reset_timer))
}

#[derive(Deserialize)]
struct ResetTimerQuery {
    /// Reset even while the timer is still running.
    #[serde(default)]
    force: bool,
}

#[derive(Serialize)]
struct TimerResponse {
    #[serde(flatten)]
    timer: TimerSnapshot,
    restart_available: bool,
}

/// Rewind the timer to a fresh run.
///
/// Refused while the timer has not reached its terminal state, the same way
/// the on-screen restart control only appears after the second mark. Pass
/// `?force=true` to override.
async fn reset_timer(
    State(state): State<ApiState>,
    Query(query): Query<ResetTimerQuery>,
) -> ApiResult<Json<TimerResponse>> {
    let mut session = state.session.write().await;

    if !session.restart_available() && !query.force {
        return Err(ApiError::Conflict(
            "timer is still running; pass force=true to reset anyway".to_string(),
        ));
    }

    session.reset_timer()?;
    tracing::info!("timer reset via API (force={})", query.force);

    Ok(Json(TimerResponse {
        timer: session.timer_snapshot(),
        restart_available: session.restart_available(),
    }))
}
