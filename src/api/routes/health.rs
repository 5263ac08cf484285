//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (first snapshot published)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 once a snapshot has been published.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.dashboard.snapshot().await.loaded {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.dashboard.snapshot().await;

    Json(HealthResponse {
        status: if snapshot.loaded { "healthy" } else { "loading" }.to_string(),
        snapshot_generation: snapshot.generation,
        snapshot_records: snapshot.index.record_count(),
        snapshot_built_at: snapshot.built_at,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
