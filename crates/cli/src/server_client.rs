//! HTTP client for the orchestrator's public API.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use calcgrid_core::{Expression, ExpressionStatus};

/// Client for the calcgrid orchestrator REST API.
pub struct ServerClient {
    base_url: String,
    http: reqwest::Client,
}

/// Subset of the `/health` response the CLI cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthInfo {
    pub status: String,
    pub version: String,
    pub pending_tasks: usize,
}

#[derive(Serialize)]
struct CalculateBody<'a> {
    expression: &'a str,
}

#[derive(Deserialize)]
struct CalculateReply {
    id: String,
}

#[derive(Deserialize)]
struct ExpressionList {
    expressions: Vec<Expression>,
}

#[derive(Deserialize)]
struct ErrorReply {
    error: String,
}

async fn failure(resp: reqwest::Response) -> anyhow::Error {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorReply>(&body) {
        Ok(reply) => anyhow::anyhow!("server returned {}: {}", status, reply.error),
        Err(_) => anyhow::anyhow!("server returned {}: {}", status, body),
    }
}

impl ServerClient {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::new();
        Self { base_url, http }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Probe `/health` with a short timeout.
    pub async fn health(&self) -> Result<HealthInfo> {
        let resp = self
            .http
            .get(self.url("/health"))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .context("orchestrator not reachable")?;
        if !resp.status().is_success() {
            return Err(failure(resp).await);
        }
        resp.json().await.context("failed to parse health response")
    }

    /// Submit an expression; returns its id.
    pub async fn calculate(&self, expression: &str) -> Result<String> {
        let resp = self
            .http
            .post(self.url("/api/v1/calculate"))
            .json(&CalculateBody { expression })
            .send()
            .await
            .context("failed to submit expression")?;
        if !resp.status().is_success() {
            return Err(failure(resp).await);
        }
        let reply: CalculateReply = resp.json().await.context("failed to parse submission reply")?;
        Ok(reply.id)
    }

    pub async fn expressions(&self) -> Result<Vec<Expression>> {
        let resp = self
            .http
            .get(self.url("/api/v1/expressions"))
            .send()
            .await
            .context("failed to list expressions")?;
        if !resp.status().is_success() {
            return Err(failure(resp).await);
        }
        let list: ExpressionList = resp.json().await.context("failed to parse expression list")?;
        Ok(list.expressions)
    }

    /// Fetch one expression; `None` when the id is unknown.
    pub async fn expression(&self, id: &str) -> Result<Option<Expression>> {
        let resp = self
            .http
            .get(self.url(&format!("/api/v1/expressions/{}", id)))
            .send()
            .await
            .context("failed to fetch expression")?;
        match resp.status() {
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(resp.json().await.context("failed to parse expression")?)),
            _ => Err(failure(resp).await),
        }
    }

    /// Poll an expression until it leaves `PROCESSING` or `max_wait` elapses.
    /// Returns the last observed state.
    pub async fn wait_for(&self, id: &str, max_wait: Duration) -> Result<Expression> {
        let deadline = tokio::time::Instant::now() + max_wait;
        loop {
            let Some(expr) = self.expression(id).await? else {
                bail!("expression {} not found", id);
            };
            if expr.is_finished() || tokio::time::Instant::now() >= deadline {
                return Ok(expr);
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }
}

fn status_label(status: ExpressionStatus) -> &'static str {
    match status {
        ExpressionStatus::Processing => "PROCESSING",
        ExpressionStatus::Completed => "COMPLETED",
        ExpressionStatus::Error => "ERROR",
    }
}

/// One-line rendering of an expression for terminal output.
pub fn render(expr: &Expression) -> String {
    let status = status_label(expr.status);
    match expr.result {
        Some(value) => format!("{}  {:<10}  {} = {}", expr.id, status, expr.expression, value),
        None => format!("{}  {:<10}  {}", expr.id, status, expr.expression),
    }
}
