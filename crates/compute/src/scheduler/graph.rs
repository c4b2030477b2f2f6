//! Task graph construction from a postfix token sequence.
//!
//! The sequence is evaluated against a stack of operands: numbers push a
//! literal, operators pop two operands and push a reference to the new task.
//! Each task records at most one dependency edge, to the first operand (left,
//! then right) that refers to another task. A task whose left and right
//! operands are both task results therefore only waits on the left one.

use calcgrid_core::Token;
use tracing::debug;

use super::error::SchedulerError;
use super::types::{Operand, PendingTask, TaskId};

/// Decomposition of one expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskGraph {
    /// The expression is a single literal; no tasks are needed.
    Constant(f64),
    /// Tasks in creation order plus `(task, depends_on)` edges.
    Tasks {
        tasks: Vec<PendingTask>,
        dependencies: Vec<(TaskId, TaskId)>,
    },
}

/// Build the task graph for a postfix sequence.
pub fn build_task_graph(postfix: &[Token]) -> Result<TaskGraph, SchedulerError> {
    let mut stack: Vec<Operand> = Vec::new();
    let mut tasks: Vec<PendingTask> = Vec::new();
    let mut dependencies: Vec<(TaskId, TaskId)> = Vec::new();

    for token in postfix {
        match *token {
            Token::Number(value) => stack.push(Operand::Literal(value)),
            Token::Operator(operation) => {
                let (right, left) = match (stack.pop(), stack.pop()) {
                    (Some(right), Some(left)) => (right, left),
                    _ => {
                        return Err(SchedulerError::Decomposition(format!(
                            "operator '{}' is missing an operand",
                            operation
                        )))
                    }
                };

                let task = PendingTask::new(operation, left, right);
                let edge = task.left.pending_on().or_else(|| task.right.pending_on());
                if let Some(dep) = edge {
                    dependencies.push((task.id.clone(), dep.to_string()));
                }

                stack.push(Operand::Pending(task.id.clone()));
                tasks.push(task);
            }
            Token::LeftParen | Token::RightParen => {
                return Err(SchedulerError::Decomposition(
                    "parenthesis in postfix sequence".to_string(),
                ))
            }
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(Operand::Literal(value)), true) if tasks.is_empty() => Ok(TaskGraph::Constant(value)),
        (Some(Operand::Pending(_)), true) => {
            debug!(tasks = tasks.len(), edges = dependencies.len(), "task graph built");
            Ok(TaskGraph::Tasks { tasks, dependencies })
        }
        (None, _) => Err(SchedulerError::Decomposition("empty postfix sequence".to_string())),
        _ => Err(SchedulerError::Decomposition(
            "operands left over after decomposition".to_string(),
        )),
    }
}
