//! HTTP endpoints, grouped by caller.
//!
//! `expressions` serves clients, `tasks` serves worker agents, `health`
//! serves operators and the launcher's readiness probe.

pub mod doc;
mod expressions;
mod health;
mod tasks;

pub use expressions::{calculate, get_expression, list_expressions};
pub use health::{health, scheduler_metrics};
pub use tasks::{get_task, post_task_result};
