//! Worker-facing endpoints: fetch the next task, report its result.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::debug;

use calcgrid_core::{Task, TaskResult};

use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

/// Hand out the next ready task.
#[utoipa::path(
    get,
    path = "/internal/task",
    tag = "Tasks",
    responses(
        (status = 200, description = "Task to compute", body = Task),
        (status = 204, description = "No task is ready")
    )
)]
pub async fn get_task(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    match state.scheduler.poll()? {
        Some(task) => Ok(Json(task).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Report a computed task result.
#[utoipa::path(
    post,
    path = "/internal/task",
    tag = "Tasks",
    request_body = TaskResult,
    responses(
        (status = 200, description = "Result recorded"),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "Unknown task id", body = ErrorResponse)
    )
)]
pub async fn post_task_result(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TaskResult>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(result) = payload?;
    let completion = state.scheduler.submit_result(&result.id, result.result)?;
    debug!(task_id = %result.id, ?completion, "Task result accepted");
    Ok(StatusCode::OK)
}
