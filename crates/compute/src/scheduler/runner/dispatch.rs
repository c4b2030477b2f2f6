use std::time::Instant;

use calcgrid_core::Task;
use tracing::{debug, warn};

use crate::scheduler::error::SchedulerError;
use crate::scheduler::runner::Scheduler;
use crate::scheduler::types::Operand;

impl Scheduler {
    /// Hand out the next ready task, or `None` when nothing is ready.
    ///
    /// High-priority tasks go first; within a class the earliest-created
    /// task wins. The task leaves the pending set, so it is never handed
    /// out twice.
    pub fn poll(&self) -> Result<Option<Task>, SchedulerError> {
        let mut state = self.write_state()?;

        let next = state
            .pending
            .values()
            .filter(|t| state.is_ready(&t.id))
            .max_by(|a, b| a.priority.cmp(&b.priority).then(b.seq.cmp(&a.seq)))
            .map(|t| t.id.clone());

        let Some(task_id) = next else {
            return Ok(None);
        };
        let Some(pending) = state.pending.remove(&task_id) else {
            return Ok(None);
        };
        state.dependencies.remove(&task_id);

        let resolve = |operand: &Operand| match operand.resolve(&state.results) {
            Some(value) => value,
            None => {
                warn!(
                    task_id = %pending.id,
                    waits_on = operand.pending_on().unwrap_or_default(),
                    "Dispatching task with unresolved operand, sending 0"
                );
                0.0
            }
        };
        let task = Task {
            id: pending.id.clone(),
            arg1: resolve(&pending.left),
            arg2: resolve(&pending.right),
            operation: pending.operation,
            priority: pending.priority,
        };

        state
            .in_flight
            .insert(task.id.clone(), (task.operation, Instant::now()));
        drop(state);

        if let Ok(mut m) = self.metrics.write() {
            m.record_dispatch(task.operation);
        }
        debug!(
            task_id = %task.id,
            "Dispatched {} {} {}",
            task.arg1, task.operation, task.arg2
        );
        Ok(Some(task))
    }
}
