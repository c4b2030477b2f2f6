//! Dataflow scheduler that decomposes arithmetic expressions into a graph of
//! binary tasks and hands them out to polling workers.

pub mod scheduler;

pub use scheduler::{
    Completion, ExpressionEvaluator, Operand, PendingTask, Scheduler, SchedulerError,
    SchedulerMetrics, TaskGraph, build_task_graph,
};
