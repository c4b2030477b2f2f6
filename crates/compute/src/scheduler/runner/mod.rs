//! Scheduler runner -- the lock-guarded operations over the shared state.
//!
//! Split into focused submodules:
//! - `core`: Scheduler struct, constructor, read accessors and reset
//! - `decompose`: expression submission and task graph registration
//! - `dispatch`: ready-task selection for polling workers
//! - `completion`: result recording and expression finalization

mod completion;
mod core;
mod decompose;
mod dispatch;

pub use self::core::Scheduler;
