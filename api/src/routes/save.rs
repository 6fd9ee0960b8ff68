//! Save-data endpoints

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;

use crate::{ApiResult, ApiState};

/// Register save routes
pub fn save_routes() -> Router<ApiState> {
    Router::new().route("/clear", post(clear_save))
}

#[derive(Serialize)]
struct ClearSaveResponse {
    cleared: bool,
}

/// Delete every persisted save key. The live session keeps its in-memory
/// state and writes it back on the next change.
async fn clear_save(State(state): State<ApiState>) -> ApiResult<Json<ClearSaveResponse>> {
    let mut session = state.session.write().await;
    session.clear_save()?;
    tracing::info!("save data cleared via API");

    Ok(Json(ClearSaveResponse { cleared: true }))
}
