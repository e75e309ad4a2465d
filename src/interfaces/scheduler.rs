use std::sync::Arc;
use std::time::Duration;
use crate::error::Result;

/// Body of a periodic task.
pub type TickFn = Arc<dyn Fn() + Send + Sync + 'static>;

/// Runs periodic tasks on behalf of counters. One scheduler is normally shared by many counters.
pub trait Scheduler: Send + Sync {
    /// Runs `task` every `period`, first firing one `period` from now.
    fn schedule_at_fixed_rate(
        &self,
        name: &str,
        period: Duration,
        task: TickFn,
    ) -> Result<Box<dyn ScheduledTask>>;
}

/// Handle to a task registered with a [`Scheduler`].
pub trait ScheduledTask: Send {
    /// Stops future firings. A firing already in progress may still complete.
    fn cancel(&mut self);

    fn is_cancelled(&self) -> bool;
}
