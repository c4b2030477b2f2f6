use std::collections::HashMap;

use calcgrid_core::{ExpressionStatus, Operation, Priority};

/// Unique identifier for a task.
pub type TaskId = String;

/// Unique identifier for an expression.
pub type ExpressionId = String;

/// One operand slot of a pending task.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal value from the expression text.
    Literal(f64),
    /// The not-yet-known result of another task.
    Pending(TaskId),
}

impl Operand {
    /// Task id this operand waits on, if any.
    pub fn pending_on(&self) -> Option<&str> {
        match self {
            Operand::Literal(_) => None,
            Operand::Pending(id) => Some(id),
        }
    }

    /// Value of the operand given the recorded results, if known.
    pub fn resolve(&self, results: &HashMap<TaskId, f64>) -> Option<f64> {
        match self {
            Operand::Literal(v) => Some(*v),
            Operand::Pending(id) => results.get(id).copied(),
        }
    }
}

/// An atomic binary operation waiting to be dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTask {
    pub id: TaskId,
    pub operation: Operation,
    pub left: Operand,
    pub right: Operand,
    pub priority: Priority,
    /// Creation sequence; earlier tasks win ties within a priority class.
    pub seq: u64,
}

impl PendingTask {
    pub fn new(operation: Operation, left: Operand, right: Operand) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            operation,
            left,
            right,
            priority: operation.priority(),
            seq: 0,
        }
    }
}

/// Outcome of recording a task result.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Other tasks of the same expression are still outstanding.
    Pending,
    /// This result completed the expression.
    Finalized {
        expression_id: ExpressionId,
        status: ExpressionStatus,
    },
}
