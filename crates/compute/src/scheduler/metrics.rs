use std::collections::HashMap;
use std::time::Duration;

use calcgrid_core::{ExpressionStatus, Operation};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Scheduler operational counters exposed over HTTP.
#[derive(Debug, Clone, Default, Serialize, utoipa::ToSchema)]
pub struct SchedulerMetrics {
    pub expressions_submitted: u64,
    pub expressions_completed: u64,
    pub expressions_failed: u64,
    pub tasks_created: u64,
    pub tasks_completed: u64,
    /// Dispatch count by operation symbol.
    pub tasks_dispatched: HashMap<String, u64>,
    /// Mean time from dispatch to result, by operation symbol.
    #[schema(value_type = Object)]
    pub avg_turnaround: HashMap<String, Duration>,
    /// Last dispatch time by operation symbol.
    #[schema(value_type = Object)]
    pub last_dispatch: HashMap<String, DateTime<Utc>>,
    #[serde(skip)]
    turnaround_samples: HashMap<String, u64>,
}

impl SchedulerMetrics {
    pub fn record_submission(&mut self, task_count: usize) {
        self.expressions_submitted += 1;
        self.tasks_created += task_count as u64;
    }

    pub fn record_dispatch(&mut self, operation: Operation) {
        let key = operation.symbol().to_string();
        *self.tasks_dispatched.entry(key.clone()).or_default() += 1;
        self.last_dispatch.insert(key, Utc::now());
    }

    /// Count an accepted task result, dispatched or not.
    pub fn record_result(&mut self) {
        self.tasks_completed += 1;
    }

    /// Fold a dispatched task's dispatch-to-result time into its operation's mean.
    pub fn record_turnaround(&mut self, operation: Operation, turnaround: Duration) {
        let key = operation.symbol().to_string();
        let count = {
            let c = self.turnaround_samples.entry(key.clone()).or_default();
            *c += 1;
            *c
        };
        let prev_avg = self.avg_turnaround.get(&key).copied().unwrap_or_default();

        // Incremental mean: new_avg = prev_avg + (sample - prev_avg) / count
        let new_avg = if count == 1 {
            turnaround
        } else {
            let prev_nanos = prev_avg.as_nanos() as f64;
            let cur_nanos = turnaround.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / count as f64;
            Duration::from_nanos(avg_nanos as u64)
        };
        self.avg_turnaround.insert(key, new_avg);
    }

    pub fn record_finalized(&mut self, status: ExpressionStatus) {
        match status {
            ExpressionStatus::Completed => self.expressions_completed += 1,
            ExpressionStatus::Error => self.expressions_failed += 1,
            ExpressionStatus::Processing => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_single_completion() {
        let mut m = SchedulerMetrics::default();
        m.record_dispatch(Operation::Mul);
        m.record_result();
        m.record_turnaround(Operation::Mul, Duration::from_millis(100));

        assert_eq!(m.tasks_dispatched["*"], 1);
        assert!(m.last_dispatch.contains_key("*"));
        assert_eq!(m.tasks_completed, 1);
        assert_eq!(m.avg_turnaround["*"], Duration::from_millis(100));
    }

    #[test]
    fn turnaround_is_averaged_per_operation() {
        let mut m = SchedulerMetrics::default();
        m.record_turnaround(Operation::Add, Duration::from_millis(100));
        m.record_turnaround(Operation::Add, Duration::from_millis(200));
        m.record_turnaround(Operation::Div, Duration::from_millis(50));

        let avg = m.avg_turnaround["+"].as_millis();
        assert!((140..=160).contains(&avg), "expected ~150ms, got {}ms", avg);
        assert_eq!(m.avg_turnaround["/"], Duration::from_millis(50));
    }

    #[test]
    fn finalization_counters() {
        let mut m = SchedulerMetrics::default();
        m.record_submission(3);
        m.record_finalized(ExpressionStatus::Completed);
        m.record_finalized(ExpressionStatus::Error);
        assert_eq!(m.expressions_submitted, 1);
        assert_eq!(m.tasks_created, 3);
        assert_eq!(m.expressions_completed, 1);
        assert_eq!(m.expressions_failed, 1);
    }

    #[test]
    fn sample_counts_are_not_serialized() {
        let mut m = SchedulerMetrics::default();
        m.record_result();
        m.record_turnaround(Operation::Sub, Duration::from_millis(10));
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("turnaround_samples").is_none());
        assert_eq!(json["tasks_completed"], 1);
    }
}
