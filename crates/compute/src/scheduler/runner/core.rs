use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use calcgrid_core::{Calculator, Expression};
use tracing::info;

use crate::scheduler::error::SchedulerError;
use crate::scheduler::evaluator::ExpressionEvaluator;
use crate::scheduler::metrics::SchedulerMetrics;
use crate::scheduler::state::SchedulerState;

/// The expression scheduler. Decomposes submitted expressions into tasks,
/// hands ready tasks to polling workers and folds their results back in.
///
/// Every operation takes the single state lock for its whole critical
/// section, so callers may share one instance across request handlers.
pub struct Scheduler {
    pub(super) state: RwLock<SchedulerState>,
    pub(super) evaluator: Arc<dyn ExpressionEvaluator>,
    pub(super) metrics: Arc<RwLock<SchedulerMetrics>>,
}

impl Scheduler {
    pub fn new(evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self {
            state: RwLock::new(SchedulerState::default()),
            evaluator,
            metrics: Arc::new(RwLock::new(SchedulerMetrics::default())),
        }
    }

    /// Scheduler backed by the built-in [`Calculator`].
    pub fn with_calculator() -> Self {
        Self::new(Arc::new(Calculator::new()))
    }

    pub(super) fn read_state(&self) -> Result<RwLockReadGuard<'_, SchedulerState>, SchedulerError> {
        self.state
            .read()
            .map_err(|e| SchedulerError::LockPoisoned(e.to_string()))
    }

    pub(super) fn write_state(&self) -> Result<RwLockWriteGuard<'_, SchedulerState>, SchedulerError> {
        self.state
            .write()
            .map_err(|e| SchedulerError::LockPoisoned(e.to_string()))
    }

    /// All expressions in ascending id order (submission order).
    pub fn expressions(&self) -> Result<Vec<Expression>, SchedulerError> {
        Ok(self.read_state()?.expressions.values().cloned().collect())
    }

    pub fn expression(&self, id: &str) -> Result<Option<Expression>, SchedulerError> {
        Ok(self.read_state()?.expressions.get(id).cloned())
    }

    /// Number of tasks not yet handed to a worker.
    pub fn pending_task_count(&self) -> Result<usize, SchedulerError> {
        Ok(self.read_state()?.pending.len())
    }

    /// Drop every expression, task and result.
    pub fn reset(&self) -> Result<(), SchedulerError> {
        self.write_state()?.clear();
        if let Ok(mut m) = self.metrics.write() {
            *m = SchedulerMetrics::default();
        }
        info!("Scheduler state reset");
        Ok(())
    }

    /// Get a snapshot of the current scheduler metrics.
    pub fn metrics(&self) -> SchedulerMetrics {
        self.metrics
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::with_calculator()
    }
}
