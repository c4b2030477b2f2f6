use calcgrid_core::CalcError;

/// Error type for scheduler operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The submitted text is not a valid expression.
    #[error("Invalid expression: {0}")]
    Validation(#[from] CalcError),
    /// The postfix sequence could not be turned into a task graph.
    #[error("Decomposition failed: {0}")]
    Decomposition(String),
    /// Unknown or already finalized task id.
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    /// A worker reported a value that is not a finite number.
    #[error("Invalid result: {0}")]
    InvalidResult(String),
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}
