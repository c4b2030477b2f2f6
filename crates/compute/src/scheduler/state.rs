use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use calcgrid_core::{Expression, Operation};

use super::types::{ExpressionId, PendingTask, TaskId};

/// The scheduler's authoritative in-memory store.
///
/// Collections are co-mutated and only ever touched while the owning
/// [`Scheduler`](super::Scheduler) holds its lock. Expressions are kept in a
/// `BTreeMap` so listing is in ascending id order.
#[derive(Debug, Default)]
pub struct SchedulerState {
    /// Every expression ever submitted (never removed).
    pub(crate) expressions: BTreeMap<ExpressionId, Expression>,
    /// Tasks not yet handed to a worker.
    pub(crate) pending: HashMap<TaskId, PendingTask>,
    /// Recorded task results (first value wins).
    pub(crate) results: HashMap<TaskId, f64>,
    /// task -> owning expression
    pub(crate) task_owner: HashMap<TaskId, ExpressionId>,
    /// expression -> task ids in creation order
    pub(crate) expression_tasks: HashMap<ExpressionId, Vec<TaskId>>,
    /// task -> the single task it waits on
    pub(crate) dependencies: HashMap<TaskId, TaskId>,
    /// Dispatched tasks awaiting a result, for turnaround metrics.
    pub(crate) in_flight: HashMap<TaskId, (Operation, Instant)>,
    pub(crate) next_seq: u64,
}

impl SchedulerState {
    /// A pending task is ready when its dependency (if any) has a result.
    pub(crate) fn is_ready(&self, task_id: &str) -> bool {
        match self.dependencies.get(task_id) {
            None => true,
            Some(dep) => self.results.contains_key(dep),
        }
    }

    /// Whether every task of the expression has a recorded result.
    pub(crate) fn all_results_recorded(&self, expression_id: &str) -> bool {
        self.expression_tasks
            .get(expression_id)
            .map(|ids| ids.iter().all(|id| self.results.contains_key(id)))
            .unwrap_or(false)
    }

    /// Drop all task bookkeeping for an expression. The expression record stays.
    pub(crate) fn purge(&mut self, expression_id: &str) {
        let Some(task_ids) = self.expression_tasks.remove(expression_id) else {
            return;
        };
        for id in &task_ids {
            self.results.remove(id);
            self.task_owner.remove(id);
            self.dependencies.remove(id);
            self.pending.remove(id);
            self.in_flight.remove(id);
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::types::Operand;

    fn state_with_chain() -> (SchedulerState, TaskId, TaskId) {
        let mut state = SchedulerState::default();
        let expr = Expression::new("2+3*4");
        let mul = PendingTask::new(Operation::Mul, Operand::Literal(3.0), Operand::Literal(4.0));
        let add = PendingTask::new(
            Operation::Add,
            Operand::Literal(2.0),
            Operand::Pending(mul.id.clone()),
        );
        let (mul_id, add_id) = (mul.id.clone(), add.id.clone());

        state.dependencies.insert(add_id.clone(), mul_id.clone());
        for t in [&mul, &add] {
            state.task_owner.insert(t.id.clone(), expr.id.clone());
        }
        state
            .expression_tasks
            .insert(expr.id.clone(), vec![mul_id.clone(), add_id.clone()]);
        state.pending.insert(mul_id.clone(), mul);
        state.pending.insert(add_id.clone(), add);
        state.expressions.insert(expr.id.clone(), expr);
        (state, mul_id, add_id)
    }

    #[test]
    fn readiness_follows_dependency_results() {
        let (mut state, mul_id, add_id) = state_with_chain();
        assert!(state.is_ready(&mul_id));
        assert!(!state.is_ready(&add_id));

        state.results.insert(mul_id, 12.0);
        assert!(state.is_ready(&add_id));
    }

    #[test]
    fn purge_keeps_expression_record() {
        let (mut state, mul_id, add_id) = state_with_chain();
        let expr_id = state.expressions.keys().next().cloned().unwrap();
        state.results.insert(mul_id.clone(), 12.0);
        state.results.insert(add_id.clone(), 14.0);
        assert!(state.all_results_recorded(&expr_id));

        state.purge(&expr_id);
        assert!(state.results.is_empty());
        assert!(state.task_owner.is_empty());
        assert!(state.dependencies.is_empty());
        assert!(state.pending.is_empty());
        assert!(state.expression_tasks.is_empty());
        assert_eq!(state.expressions.len(), 1);
        assert!(!state.all_results_recorded(&expr_id));
    }
}
