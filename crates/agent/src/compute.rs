use calcgrid_core::config::OperationTimings;
use calcgrid_core::{Operation, Task};
use tracing::debug;

/// Apply one binary operation. Division by zero yields `0.0`.
pub fn apply(operation: Operation, arg1: f64, arg2: f64) -> f64 {
    match operation {
        Operation::Add => arg1 + arg2,
        Operation::Sub => arg1 - arg2,
        Operation::Mul => arg1 * arg2,
        Operation::Div if arg2 == 0.0 => 0.0,
        Operation::Div => arg1 / arg2,
    }
}

/// Compute a task after sleeping for the configured operation latency.
pub async fn compute(task: &Task, timings: &OperationTimings) -> f64 {
    let delay = timings.delay_for(task.operation);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let value = apply(task.operation, task.arg1, task.arg2);
    debug!(
        task_id = %task.id,
        delay_ms = delay.as_millis() as u64,
        "{} {} {} = {}",
        task.arg1, task.operation, task.arg2, value
    );
    value
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use calcgrid_core::Priority;

    use super::*;

    fn task(operation: Operation, arg1: f64, arg2: f64) -> Task {
        Task {
            id: "t".to_string(),
            arg1,
            arg2,
            operation,
            priority: operation.priority(),
        }
    }

    #[test]
    fn applies_each_operation() {
        assert_eq!(apply(Operation::Add, 2.0, 3.0), 5.0);
        assert_eq!(apply(Operation::Sub, 2.0, 3.0), -1.0);
        assert_eq!(apply(Operation::Mul, 2.0, 3.0), 6.0);
        assert_eq!(apply(Operation::Div, 3.0, 2.0), 1.5);
    }

    #[test]
    fn division_by_zero_yields_zero() {
        assert_eq!(apply(Operation::Div, 7.0, 0.0), 0.0);
    }

    #[tokio::test]
    async fn compute_waits_for_operation_latency() {
        let timings = OperationTimings {
            multiplication_ms: 30,
            ..OperationTimings::instant()
        };
        let t = task(Operation::Mul, 3.0, 4.0);
        assert_eq!(t.priority, Priority::High);

        let started = Instant::now();
        assert_eq!(compute(&t, &timings).await, 12.0);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
