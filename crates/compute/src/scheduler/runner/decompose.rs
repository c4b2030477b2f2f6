use calcgrid_core::{Expression, ExpressionStatus};
use tracing::{debug, info};

use crate::scheduler::error::SchedulerError;
use crate::scheduler::graph::{build_task_graph, TaskGraph};
use crate::scheduler::runner::Scheduler;
use crate::scheduler::types::ExpressionId;

impl Scheduler {
    /// Validate an expression, decompose it into tasks and register them.
    ///
    /// Returns the new expression id. Nothing is registered when validation
    /// or decomposition fails. A lone literal completes immediately.
    pub fn submit(&self, text: &str) -> Result<ExpressionId, SchedulerError> {
        self.evaluator.evaluate(text)?;
        let postfix = self
            .evaluator
            .postfix(text)
            .map_err(|e| SchedulerError::Decomposition(e.to_string()))?;
        let graph = build_task_graph(&postfix)?;

        let mut expression = Expression::new(text);
        let id = expression.id.clone();

        let task_count = {
            let mut state = self.write_state()?;
            match graph {
                TaskGraph::Constant(value) => {
                    expression.complete(value);
                    state.expressions.insert(id.clone(), expression);
                    0
                }
                TaskGraph::Tasks { tasks, dependencies } => {
                    let count = tasks.len();
                    let mut task_ids = Vec::with_capacity(count);
                    for mut task in tasks {
                        task.seq = state.next_seq;
                        state.next_seq += 1;
                        state.task_owner.insert(task.id.clone(), id.clone());
                        task_ids.push(task.id.clone());
                        state.pending.insert(task.id.clone(), task);
                    }
                    for (task, depends_on) in dependencies {
                        state.dependencies.insert(task, depends_on);
                    }
                    state.expression_tasks.insert(id.clone(), task_ids);
                    state.expressions.insert(id.clone(), expression);
                    count
                }
            }
        };

        if let Ok(mut m) = self.metrics.write() {
            m.record_submission(task_count);
            if task_count == 0 {
                m.record_finalized(ExpressionStatus::Completed);
            }
        }

        if task_count == 0 {
            debug!(expression_id = %id, "constant expression completed on submission");
        }
        info!(expression_id = %id, tasks = task_count, "Expression submitted: {}", text);
        Ok(id)
    }
}
