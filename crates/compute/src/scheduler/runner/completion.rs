use calcgrid_core::ExpressionStatus;
use tracing::{debug, info, warn};

use crate::scheduler::error::SchedulerError;
use crate::scheduler::runner::Scheduler;
use crate::scheduler::types::Completion;

impl Scheduler {
    /// Record a worker's result for a task.
    ///
    /// Unknown ids and non-finite values are rejected before anything is stored. The first result
    /// for a task wins; repeats are ignored. When the last task of an
    /// expression reports, the expression is re-evaluated from its text and
    /// its task bookkeeping is dropped.
    pub fn submit_result(&self, task_id: &str, value: f64) -> Result<Completion, SchedulerError> {
        let mut state = self.write_state()?;

        let Some(expression_id) = state.task_owner.get(task_id).cloned() else {
            return Err(SchedulerError::TaskNotFound(task_id.to_string()));
        };
        if !value.is_finite() {
            return Err(SchedulerError::InvalidResult(format!(
                "task {} reported non-finite value {}",
                task_id, value
            )));
        }

        if state.results.contains_key(task_id) {
            debug!(task_id, "Duplicate result ignored");
            return Ok(Completion::Pending);
        }
        state.results.insert(task_id.to_string(), value);
        let turnaround = state
            .in_flight
            .remove(task_id)
            .map(|(op, started)| (op, started.elapsed()));

        if let Ok(mut m) = self.metrics.write() {
            m.record_result();
            if let Some((op, elapsed)) = turnaround {
                m.record_turnaround(op, elapsed);
            }
        }
        debug!(task_id, value, expression_id = %expression_id, "Task result recorded");

        if !state.all_results_recorded(&expression_id) {
            return Ok(Completion::Pending);
        }

        let Some(expression) = state.expressions.get_mut(&expression_id) else {
            state.purge(&expression_id);
            return Ok(Completion::Pending);
        };
        let status = match self.evaluator.evaluate(&expression.expression) {
            Ok(result) => {
                expression.complete(result);
                info!(expression_id = %expression_id, result, "Expression completed");
                ExpressionStatus::Completed
            }
            Err(e) => {
                expression.fail();
                warn!(expression_id = %expression_id, "Expression failed on final evaluation: {}", e);
                ExpressionStatus::Error
            }
        };
        state.purge(&expression_id);
        drop(state);

        if let Ok(mut m) = self.metrics.write() {
            m.record_finalized(status);
        }
        Ok(Completion::Finalized {
            expression_id,
            status,
        })
    }
}
