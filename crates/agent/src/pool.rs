//! Fixed-size pool of polling workers.
//!
//! Each poller loops acquire → fetch → compute → submit → release, then
//! sleeps the back-off interval whatever the outcome. The semaphore caps
//! in-flight operations at the configured computing power.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use calcgrid_core::config::{AgentConfig, OperationTimings};
use calcgrid_core::TaskResult;

use crate::compute::compute;
use crate::error::AgentError;
use crate::source::TaskSource;

/// Pool counters, shared by every poller.
#[derive(Debug, Default)]
pub struct PoolStats {
    pub completed: AtomicU64,
    pub empty_polls: AtomicU64,
    pub failures: AtomicU64,
}

/// Outcome of one poller round trip.
enum Round {
    Computed,
    Idle,
}

pub struct WorkerPool {
    source: Arc<dyn TaskSource>,
    timings: OperationTimings,
    workers: usize,
    backoff: Duration,
    permits: Arc<Semaphore>,
    shutdown: Arc<AtomicBool>,
    stats: Arc<PoolStats>,
}

impl WorkerPool {
    pub fn new(source: Arc<dyn TaskSource>, config: &AgentConfig) -> Self {
        let workers = config.computing_power.max(1);
        Self {
            source,
            timings: config.timings,
            workers,
            backoff: config.backoff(),
            permits: Arc::new(Semaphore::new(workers)),
            shutdown: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(PoolStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<PoolStats> {
        Arc::clone(&self.stats)
    }

    /// Signal every poller to stop after its current round trip.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        info!("Worker pool stopping");
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Run all pollers until [`stop`](Self::stop) is called.
    pub async fn run(&self) {
        info!(
            workers = self.workers,
            backoff_ms = self.backoff.as_millis() as u64,
            "Worker pool started"
        );

        let mut pollers = JoinSet::new();
        for worker in 0..self.workers {
            let poller = Poller {
                worker,
                source: Arc::clone(&self.source),
                timings: self.timings,
                backoff: self.backoff,
                permits: Arc::clone(&self.permits),
                shutdown: Arc::clone(&self.shutdown),
                stats: Arc::clone(&self.stats),
            };
            pollers.spawn(poller.run());
        }

        while let Some(joined) = pollers.join_next().await {
            if let Err(e) = joined {
                warn!("Poller task ended abnormally: {}", e);
            }
        }
        info!(
            completed = self.stats.completed.load(Ordering::Relaxed),
            failures = self.stats.failures.load(Ordering::Relaxed),
            "Worker pool stopped"
        );
    }
}

struct Poller {
    worker: usize,
    source: Arc<dyn TaskSource>,
    timings: OperationTimings,
    backoff: Duration,
    permits: Arc<Semaphore>,
    shutdown: Arc<AtomicBool>,
    stats: Arc<PoolStats>,
}

impl Poller {
    async fn run(self) {
        debug!(worker = self.worker, "poller started");
        while !self.shutdown.load(Ordering::Relaxed) {
            let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
                break;
            };
            let outcome = self.round_trip().await;
            drop(permit);

            match outcome {
                Ok(Round::Computed) => {
                    self.stats.completed.fetch_add(1, Ordering::Relaxed);
                }
                Ok(Round::Idle) => {
                    self.stats.empty_polls.fetch_add(1, Ordering::Relaxed);
                }
                Err(AgentError::Rejected(id)) => {
                    self.stats.failures.fetch_add(1, Ordering::Relaxed);
                    warn!(worker = self.worker, task_id = %id, "Orchestrator rejected result");
                }
                Err(e) => {
                    self.stats.failures.fetch_add(1, Ordering::Relaxed);
                    warn!(worker = self.worker, "Round trip failed: {}", e);
                }
            }

            tokio::time::sleep(self.backoff).await;
        }
        debug!(worker = self.worker, "poller stopped");
    }

    async fn round_trip(&self) -> Result<Round, AgentError> {
        let Some(task) = self.source.fetch_task().await? else {
            return Ok(Round::Idle);
        };
        debug!(worker = self.worker, task_id = %task.id, operation = %task.operation, "task received");

        let result = compute(&task, &self.timings).await;
        self.source
            .submit_result(&TaskResult {
                id: task.id,
                result,
            })
            .await?;
        Ok(Round::Computed)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use calcgrid_compute::Scheduler;
    use calcgrid_core::{ExpressionStatus, Operation, Task};

    use super::*;

    fn config(workers: usize, timings: OperationTimings) -> AgentConfig {
        AgentConfig {
            computing_power: workers,
            backoff_ms: 1,
            timings,
            ..AgentConfig::default()
        }
    }

    /// Source backed directly by an in-process scheduler.
    struct SchedulerSource(Arc<Scheduler>);

    #[async_trait]
    impl TaskSource for SchedulerSource {
        async fn fetch_task(&self) -> Result<Option<Task>, AgentError> {
            self.0.poll().map_err(|e| AgentError::Source(e.to_string()))
        }

        async fn submit_result(&self, result: &TaskResult) -> Result<(), AgentError> {
            self.0
                .submit_result(&result.id, result.result)
                .map(|_| ())
                .map_err(|_| AgentError::Rejected(result.id.clone()))
        }
    }

    /// Fixed queue of tasks; records results and peak concurrency.
    #[derive(Default)]
    struct QueueSource {
        tasks: Mutex<VecDeque<Task>>,
        results: Mutex<Vec<TaskResult>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        reject: bool,
    }

    impl QueueSource {
        fn with_tasks(n: usize) -> Self {
            let tasks = (0..n)
                .map(|i| Task {
                    id: format!("t{}", i),
                    arg1: i as f64,
                    arg2: 2.0,
                    operation: Operation::Mul,
                    priority: Operation::Mul.priority(),
                })
                .collect();
            Self {
                tasks: Mutex::new(tasks),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl TaskSource for QueueSource {
        async fn fetch_task(&self) -> Result<Option<Task>, AgentError> {
            let task = self.tasks.lock().unwrap().pop_front();
            if task.is_some() {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
            }
            Ok(task)
        }

        async fn submit_result(&self, result: &TaskResult) -> Result<(), AgentError> {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.reject {
                return Err(AgentError::Rejected(result.id.clone()));
            }
            self.results.lock().unwrap().push(result.clone());
            Ok(())
        }
    }

    /// Source that always fails.
    struct DownSource;

    #[async_trait]
    impl TaskSource for DownSource {
        async fn fetch_task(&self) -> Result<Option<Task>, AgentError> {
            Err(AgentError::Source("connection refused".to_string()))
        }

        async fn submit_result(&self, _result: &TaskResult) -> Result<(), AgentError> {
            Err(AgentError::Source("connection refused".to_string()))
        }
    }

    async fn run_until<F: Fn() -> bool>(pool: Arc<WorkerPool>, done: F) {
        let runner = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.run().await })
        };
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !done() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        pool.stop();
        runner.await.unwrap();
    }

    #[tokio::test]
    async fn pool_drives_expression_to_completion() {
        let scheduler = Arc::new(Scheduler::with_calculator());
        let id = scheduler.submit("2+3*4-(6/3)").unwrap();

        let source = Arc::new(SchedulerSource(Arc::clone(&scheduler)));
        let pool = Arc::new(WorkerPool::new(source, &config(2, OperationTimings::instant())));

        let probe = Arc::clone(&scheduler);
        let probe_id = id.clone();
        run_until(Arc::clone(&pool), move || {
            probe
                .expression(&probe_id)
                .unwrap()
                .map(|e| e.is_finished())
                .unwrap_or(false)
        })
        .await;

        let expr = scheduler.expression(&id).unwrap().unwrap();
        assert_eq!(expr.status, ExpressionStatus::Completed);
        assert_eq!(expr.result, Some(12.0));
        assert_eq!(pool.stats().completed.load(Ordering::Relaxed), 4);
    }

    #[tokio::test]
    async fn concurrency_is_capped_by_computing_power() {
        let source = Arc::new(QueueSource::with_tasks(8));
        let timings = OperationTimings {
            multiplication_ms: 20,
            ..OperationTimings::instant()
        };
        let pool = Arc::new(WorkerPool::new(source.clone(), &config(3, timings)));

        let probe = Arc::clone(&source);
        run_until(pool, move || probe.results.lock().unwrap().len() == 8).await;

        let results = source.results.lock().unwrap();
        assert_eq!(results.len(), 8);
        assert!(results.iter().any(|r| r.id == "t5" && r.result == 10.0));
        let peak = source.peak.load(Ordering::SeqCst);
        assert!((1..=3).contains(&peak), "peak concurrency {}", peak);
    }

    #[tokio::test]
    async fn rejected_results_are_counted_and_polling_continues() {
        let source = Arc::new(QueueSource {
            reject: true,
            ..QueueSource::with_tasks(2)
        });
        let pool = Arc::new(WorkerPool::new(source, &config(1, OperationTimings::instant())));
        let stats = pool.stats();

        let probe = Arc::clone(&stats);
        run_until(pool, move || probe.empty_polls.load(Ordering::Relaxed) > 0).await;

        assert_eq!(stats.failures.load(Ordering::Relaxed), 2);
        assert_eq!(stats.completed.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn transport_failures_back_off_and_retry() {
        let pool = Arc::new(WorkerPool::new(
            Arc::new(DownSource),
            &config(2, OperationTimings::instant()),
        ));
        let stats = pool.stats();

        let probe = Arc::clone(&stats);
        run_until(Arc::clone(&pool), move || probe.failures.load(Ordering::Relaxed) >= 4).await;

        assert!(pool.is_stopped());
        assert!(stats.failures.load(Ordering::Relaxed) >= 4);
        assert_eq!(stats.completed.load(Ordering::Relaxed), 0);
    }
}
