//! Liveness and scheduler metrics endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use calcgrid_compute::SchedulerMetrics;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub profile: String,
    pub pending_tasks: usize,
}

/// Server liveness and queue depth.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        profile: state.config.profile_label().to_string(),
        pending_tasks: state.scheduler.pending_task_count()?,
    }))
}

/// Scheduler counters: submissions, dispatches and turnaround per operation.
#[utoipa::path(
    get,
    path = "/scheduler/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Scheduler metrics snapshot", body = SchedulerMetrics)
    )
)]
pub async fn scheduler_metrics(State(state): State<Arc<AppState>>) -> Json<SchedulerMetrics> {
    Json(state.scheduler.metrics())
}
