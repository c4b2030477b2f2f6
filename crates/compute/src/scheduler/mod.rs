//! Dependency-aware priority scheduler for expression tasks.
//!
//! An expression is decomposed into [`PendingTask`]s (see [`graph`]); workers
//! poll the [`Scheduler`] for the next ready task, multiplicative before
//! additive, and push results back. Once every task of an expression has a
//! result the expression is finalized by re-evaluating its original text.
//!
//! All mutations go through one coarse `RwLock` around [`state::SchedulerState`].

pub mod error;
pub mod evaluator;
pub mod graph;
pub mod metrics;
pub mod runner;
pub mod state;
pub mod types;

pub use error::SchedulerError;
pub use evaluator::ExpressionEvaluator;
pub use graph::{TaskGraph, build_task_graph};
pub use metrics::SchedulerMetrics;
pub use runner::Scheduler;
pub use types::{Completion, ExpressionId, Operand, PendingTask, TaskId};
