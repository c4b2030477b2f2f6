//! OpenAPI documentation aggregator, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "calcgrid orchestrator API",
        version = "0.1.0",
        description = "Distributed arithmetic evaluation: expressions are split into binary tasks computed by polling agents.",
    ),
    tags(
        (name = "Expressions", description = "Submit and inspect arithmetic expressions"),
        (name = "Tasks", description = "Internal task exchange with worker agents"),
        (name = "Health", description = "Liveness and scheduler metrics"),
    ),
    paths(
        crate::api::expressions::calculate,
        crate::api::expressions::list_expressions,
        crate::api::expressions::get_expression,
        crate::api::tasks::get_task,
        crate::api::tasks::post_task_result,
        crate::api::health::health,
        crate::api::health::scheduler_metrics,
    ),
    components(schemas(
        crate::api::expressions::CalculateRequest,
        crate::api::expressions::CalculateResponse,
        crate::api::expressions::ExpressionList,
        crate::api::health::HealthResponse,
        crate::error::ErrorResponse,
        calcgrid_core::Expression,
        calcgrid_core::ExpressionStatus,
        calcgrid_core::Task,
        calcgrid_core::TaskResult,
        calcgrid_core::Operation,
        calcgrid_compute::SchedulerMetrics,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/calculate",
            "/api/v1/expressions",
            "/api/v1/expressions/{id}",
            "/internal/task",
            "/health",
            "/scheduler/metrics",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
