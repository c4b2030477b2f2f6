//! Task source seam between the worker pool and the orchestrator.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use calcgrid_core::{Task, TaskResult};

use crate::error::AgentError;

/// Where workers get tasks from and send results to.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch the next ready task. `Ok(None)` means nothing is ready.
    async fn fetch_task(&self) -> Result<Option<Task>, AgentError>;

    /// Report a computed result.
    async fn submit_result(&self, result: &TaskResult) -> Result<(), AgentError>;
}

/// [`TaskSource`] over the orchestrator's `/internal/task` endpoint.
pub struct HttpTaskSource {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpTaskSource {
    pub fn new(base_url: &str) -> Self {
        let endpoint = format!("{}/internal/task", base_url.trim_end_matches('/'));
        Self {
            endpoint,
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

async fn unexpected(resp: reqwest::Response) -> AgentError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    AgentError::UnexpectedStatus { status, body }
}

#[async_trait]
impl TaskSource for HttpTaskSource {
    async fn fetch_task(&self) -> Result<Option<Task>, AgentError> {
        let resp = self.http.get(&self.endpoint).send().await?;
        match resp.status() {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::OK => Ok(Some(resp.json().await?)),
            _ => Err(unexpected(resp).await),
        }
    }

    async fn submit_result(&self, result: &TaskResult) -> Result<(), AgentError> {
        let resp = self.http.post(&self.endpoint).json(result).send().await?;
        match resp.status() {
            s if s.is_success() => {
                debug!(task_id = %result.id, "result accepted");
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(AgentError::Rejected(result.id.clone())),
            _ => Err(unexpected(resp).await),
        }
    }
}
