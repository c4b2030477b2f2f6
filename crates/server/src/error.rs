//! HTTP error mapping.
//!
//! Every failure leaves a handler as an [`ApiError`], rendered as
//! `{"error": "<message>"}` with the matching status code.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use calcgrid_compute::SchedulerError;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    Scheduler(SchedulerError),
    BadRequest(String),
    NotFound(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Scheduler(SchedulerError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Scheduler(SchedulerError::Decomposition(_)) => StatusCode::BAD_REQUEST,
            ApiError::Scheduler(SchedulerError::TaskNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Scheduler(SchedulerError::InvalidResult(_)) => StatusCode::BAD_REQUEST,
            ApiError::Scheduler(SchedulerError::LockPoisoned(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Scheduler(e) => e.to_string(),
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg.clone(),
        }
    }
}

impl From<SchedulerError> for ApiError {
    fn from(e: SchedulerError) -> Self {
        ApiError::Scheduler(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self.message());
        }
        (status, Json(ErrorResponse { error: self.message() })).into_response()
    }
}
