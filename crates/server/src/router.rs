//! HTTP router construction.
//!
//! Assembles the Axum routes, CORS and OpenAPI docs into a single `Router`.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/scheduler/metrics", get(api::scheduler_metrics))
        // Client API
        .route("/api/v1/calculate", post(api::calculate))
        .route("/api/v1/expressions", get(api::list_expressions))
        .route("/api/v1/expressions/{id}", get(api::get_expression))
        // Agent exchange
        .route(
            "/internal/task",
            get(api::get_task).post(api::post_task_result),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use calcgrid_compute::Scheduler;
    use calcgrid_core::Config;

    use super::*;

    fn app() -> Router {
        build_router(Arc::new(AppState::new(
            Scheduler::with_calculator(),
            Config::default(),
        )))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn submit(app: &Router, expr: &str) -> String {
        let (status, body) = send(
            app,
            post_json("/api/v1/calculate", &json!({ "expression": expr }).to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn calculate_then_compute_to_completion() {
        let app = app();
        let id = submit(&app, "2+3*4").await;

        let (status, expr) = send(&app, get_req(&format!("/api/v1/expressions/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(expr["status"], "PROCESSING");
        assert!(expr.get("result").is_none());

        let (status, task) = send(&app, get_req("/internal/task")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(task["operation"], "*");
        assert_eq!(task["priority"], 2);
        assert_eq!(task["arg1"], 3.0);
        assert_eq!(task["arg2"], 4.0);

        let (status, _) = send(&app, get_req("/internal/task")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let result = json!({ "id": task["id"], "result": 12.0 }).to_string();
        let (status, _) = send(&app, post_json("/internal/task", &result)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, task) = send(&app, get_req("/internal/task")).await;
        assert_eq!(task["operation"], "+");
        assert_eq!(task["priority"], 1);
        assert_eq!(task["arg2"], 12.0);
        let result = json!({ "id": task["id"], "result": 14.0 }).to_string();
        send(&app, post_json("/internal/task", &result)).await;

        let (_, expr) = send(&app, get_req(&format!("/api/v1/expressions/{}", id))).await;
        assert_eq!(expr["status"], "COMPLETED");
        assert_eq!(expr["result"], 14.0);
    }

    #[tokio::test]
    async fn invalid_expressions_are_unprocessable() {
        let app = app();
        for body in [
            r#"{"expression": "2+a"}"#,
            r#"{"expression": ""}"#,
            r#"{"expression": "5/0"}"#,
            r#"{"expression": "(1+2"}"#,
            r#"{}"#,
        ] {
            let (status, err) = send(&app, post_json("/api/v1/calculate", body)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
            assert!(err["error"].as_str().is_some());
        }

        let (_, list) = send(&app, get_req("/api/v1/expressions")).await;
        assert_eq!(list["expressions"], json!([]));
    }

    #[tokio::test]
    async fn out_of_range_and_deep_input_is_unprocessable() {
        let app = app();
        let huge = json!({ "expression": format!("{}+1", "9".repeat(400)) }).to_string();
        let (status, err) = send(&app, post_json("/api/v1/calculate", &huge)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err["error"].as_str().unwrap().contains("out of range"));

        let deep = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        let body = json!({ "expression": deep }).to_string();
        let (status, _) = send(&app, post_json("/api/v1/calculate", &body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(&app, get_req("/internal/task")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = app();
        let (status, err) = send(&app, post_json("/api/v1/calculate", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"].as_str().unwrap().starts_with("Invalid request body"));

        let (status, _) = send(&app, post_json("/internal/task", r#"{"id": 5}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let app = app();
        let (status, err) = send(&app, get_req("/api/v1/expressions/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(err["error"].as_str().unwrap().contains("nope"));

        let body = r#"{"id": "missing-task", "result": 1.0}"#;
        let (status, _) = send(&app, post_json("/internal/task", body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_is_in_submission_order() {
        let app = app();
        let first = submit(&app, "1+1").await;
        let second = submit(&app, "7").await;

        let (status, list) = send(&app, get_req("/api/v1/expressions")).await;
        assert_eq!(status, StatusCode::OK);
        let exprs = list["expressions"].as_array().unwrap();
        assert_eq!(exprs.len(), 2);
        assert_eq!(exprs[0]["id"], first);
        assert_eq!(exprs[1]["id"], second);
        assert_eq!(exprs[1]["status"], "COMPLETED");
        assert_eq!(exprs[1]["result"], 7.0);
    }

    #[tokio::test]
    async fn health_reports_pending_tasks() {
        let app = app();
        submit(&app, "1+2*3").await;

        let (status, health) = send(&app, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "ok");
        assert_eq!(health["pending_tasks"], 2);

        let (status, metrics) = send(&app, get_req("/scheduler/metrics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(metrics["expressions_submitted"], 1);
        assert_eq!(metrics["tasks_created"], 2);
    }

    #[tokio::test]
    async fn docs_are_served() {
        let resp = app().oneshot(get_req("/docs")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
