use calcgrid_compute::Scheduler;
use calcgrid_core::Config;

/// Shared handler state.
pub struct AppState {
    pub scheduler: Scheduler,
    pub config: Config,
}

impl AppState {
    pub fn new(scheduler: Scheduler, config: Config) -> Self {
        Self { scheduler, config }
    }
}
