//! Balance management endpoints

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{ApiResult, ApiState};

/// Register money routes
pub fn money_routes() -> Router<ApiState> {
    Router::new()
        .route("/reset", post(reset_money))
        .route("/decay", post(force_decay))
        .route("/config", post(set_decay_config))
}

#[derive(Serialize)]
struct BalanceResponse {
    balance: f64,
}

/// Put the balance back to its configured starting value.
async fn reset_money(State(state): State<ApiState>) -> ApiResult<Json<BalanceResponse>> {
    let mut session = state.session.write().await;
    session.reset_balance()?;
    tracing::info!("balance reset via API");

    Ok(Json(BalanceResponse {
        balance: session.balance(),
    }))
}

/// Apply one decay tick immediately, outside the schedule.
async fn force_decay(State(state): State<ApiState>) -> ApiResult<Json<BalanceResponse>> {
    let mut session = state.session.write().await;
    let balance = session.force_decay_tick()?;
    tracing::info!("manual decay tick applied via API");

    Ok(Json(BalanceResponse { balance }))
}

#[derive(Deserialize)]
struct DecayConfigRequest {
    amount: Option<f64>,
    interval_secs: Option<f64>,
}

#[derive(Serialize)]
struct DecayConfigResponse {
    decay_amount: f64,
    decay_interval_secs: f64,
}

/// Update the decay amount and/or interval. Changing the interval restarts
/// the schedule from now.
async fn set_decay_config(
    State(state): State<ApiState>,
    Json(request): Json<DecayConfigRequest>,
) -> ApiResult<Json<DecayConfigResponse>> {
    let mut session = state.session.write().await;

    if let Some(amount) = request.amount {
        session.set_decay_amount(amount)?;
    }
    if let Some(interval_secs) = request.interval_secs {
        session.set_decay_interval(interval_secs)?;
    }

    let status = session.status();
    tracing::info!(
        "decay config updated via API: amount={} interval={}s",
        status.decay_amount,
        status.decay_interval_secs
    );

    Ok(Json(DecayConfigResponse {
        decay_amount: status.decay_amount,
        decay_interval_secs: status.decay_interval_secs,
    }))
}
