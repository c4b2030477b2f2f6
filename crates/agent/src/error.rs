//! Agent error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The orchestrator does not know the task (already finalized or never issued).
    #[error("result rejected for task {0}")]
    Rejected(String),

    #[error("task source error: {0}")]
    Source(String),
}
