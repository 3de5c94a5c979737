//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.stores.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        database,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
