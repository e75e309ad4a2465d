use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use crate::error::{Error, Result};
use crate::interfaces::scheduler::{ScheduledTask, Scheduler, TickFn};

struct ManualEntry {
    name: String,
    period: Duration,
    task: TickFn,
    cancelled: Arc<AtomicBool>,
}

/// Scheduler that never fires on its own. Tasks run only when [`fire_all`](Self::fire_all)
/// is called, which makes tick timing fully deterministic when paired with a `ManualClock`.
#[derive(Default)]
pub struct ManualScheduler {
    entries: Mutex<Vec<ManualEntry>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every live task once, in registration order. Returns how many ran.
    pub fn fire_all(&self) -> usize {
        // Tasks run outside the lock so they may themselves touch this scheduler
        let live: Vec<TickFn> = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.retain(|entry| !entry.cancelled.load(Ordering::Acquire));
            entries.iter().map(|entry| entry.task.clone()).collect()
        };

        for task in &live {
            task();
        }
        live.len()
    }

    pub fn active_task_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| !entry.cancelled.load(Ordering::Acquire))
            .count()
    }

    /// Names and periods of the live tasks.
    pub fn scheduled(&self) -> Vec<(String, Duration)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| !entry.cancelled.load(Ordering::Acquire))
            .map(|entry| (entry.name.clone(), entry.period))
            .collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_at_fixed_rate(
        &self,
        name: &str,
        period: Duration,
        task: TickFn,
    ) -> Result<Box<dyn ScheduledTask>> {
        if period.is_zero() {
            return Err(Error::InvalidArgument("tick period must be non-zero".to_string()));
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ManualEntry {
                name: name.to_string(),
                period,
                task,
                cancelled: cancelled.clone(),
            });

        Ok(Box::new(ManualTask { cancelled }))
    }
}

struct ManualTask {
    cancelled: Arc<AtomicBool>,
}

impl ScheduledTask for ManualTask {
    fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
