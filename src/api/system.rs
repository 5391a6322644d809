//! System-level endpoints: liveness, readiness, and a status summary
//! for operators.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub database_ready: bool,
}

/// GET /health
/// Public liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SystemStatus>, ApiError> {
    let database_ready = state.store.ping().await.is_ok();

    Ok(Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database_ready,
    }))
}
