//! API routes organization
//!
//! Route groups by domain:
//! - `money` - Balance reset, manual decay, decay configuration
//! - `timer` - Phase timer restart
//! - `save` - Persisted save-data management
//!
//! Status and health live at the top level.

mod money;
mod save;
mod session;
mod timer;

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::ApiState;

/// Create the main router with all API endpoints
pub fn create_routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/status", get(session::get_status))
        .nest("/money", money::money_routes())
        .nest("/timer", timer::timer_routes())
        .nest("/save", save::save_routes())
}

async fn root() -> &'static str {
    "Upkeep Session API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
