//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (local store usable)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Ready once the local store directory exists or can be created. The
/// remote store is optional, so it does not gate readiness.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if check_local_health(&state).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let local_ok = check_local_health(&state).await;
    let status = state.store.status().await;

    let remote_ok = status.remote.as_ref().map(|r| r.connected);
    let remote = match remote_ok {
        Some(true) => "ok",
        Some(false) => "error",
        None => "disabled",
    };

    let overall = match (local_ok, remote_ok) {
        (true, Some(false)) => "degraded",
        (true, _) => "healthy",
        // Reads still fall back to defaults
        (false, Some(true)) => "degraded",
        (false, _) => "unhealthy",
    };

    Json(HealthResponse {
        status: overall.to_string(),
        local: if local_ok { "ok" } else { "error" }.to_string(),
        remote: remote.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_local_health(state: &AppState) -> bool {
    match tokio::fs::create_dir_all(state.store.local().dir()).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Local store directory unavailable");
            false
        }
    }
}
