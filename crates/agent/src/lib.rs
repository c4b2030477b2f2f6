//! Worker agent: polls the orchestrator for ready tasks, computes them with
//! a simulated per-operation latency and reports the results back.

pub mod compute;
pub mod error;
pub mod pool;
pub mod source;

pub use compute::{apply, compute};
pub use error::AgentError;
pub use pool::{PoolStats, WorkerPool};
pub use source::{HttpTaskSource, TaskSource};
