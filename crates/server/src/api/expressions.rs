//! Client-facing endpoints: submit, list and look up expressions.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use calcgrid_core::Expression;

use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CalculateRequest {
    /// Arithmetic over non-negative numbers with `+ - * /` and parentheses.
    #[serde(default)]
    pub expression: String,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct CalculateResponse {
    pub id: String,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ExpressionList {
    pub expressions: Vec<Expression>,
}

/// Submit an expression for distributed evaluation.
#[utoipa::path(
    post,
    path = "/api/v1/calculate",
    tag = "Expressions",
    request_body = CalculateRequest,
    responses(
        (status = 200, description = "Expression accepted", body = CalculateResponse),
        (status = 400, description = "Malformed body or decomposition failure", body = ErrorResponse),
        (status = 422, description = "Invalid expression", body = ErrorResponse)
    )
)]
pub async fn calculate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let Json(req) = payload?;
    let id = state.scheduler.submit(&req.expression)?;
    Ok(Json(CalculateResponse { id }))
}

/// List every expression in submission order.
#[utoipa::path(
    get,
    path = "/api/v1/expressions",
    tag = "Expressions",
    responses(
        (status = 200, description = "All expressions", body = ExpressionList)
    )
)]
pub async fn list_expressions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExpressionList>, ApiError> {
    let expressions = state.scheduler.expressions()?;
    Ok(Json(ExpressionList { expressions }))
}

/// Get one expression by id.
#[utoipa::path(
    get,
    path = "/api/v1/expressions/{id}",
    tag = "Expressions",
    params(("id" = String, Path, description = "Expression id")),
    responses(
        (status = 200, description = "Expression found", body = Expression),
        (status = 404, description = "Unknown expression id", body = ErrorResponse)
    )
)]
pub async fn get_expression(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Expression>, ApiError> {
    state
        .scheduler
        .expression(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Expression '{}' not found", id)))
}
