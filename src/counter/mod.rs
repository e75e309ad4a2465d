//! Sliding-window event counter with one bucket per second.
//!
//! Events are counted into the bucket of the current wall-clock second; a background tick
//! advances the current bucket every second and, once a full window has elapsed, clears each
//! bucket just before it is reused. Queries sum the trailing buckets ending at the current one.
//!
//! ## Example
//! ```rust,ignore
//! let counter = EventCounter::new(300, TokioScheduler::shared()?)?;
//! counter.start()?;
//! counter.record_event()?;
//! let last_30s = counter.count_events(30)?;
//! counter.stop()?;
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::clock::SystemClock;
use crate::config::CounterConfig;
use crate::error::{Error, Result};
use crate::interfaces::clock::Clock;
use crate::interfaces::scheduler::{ScheduledTask, Scheduler};
use crate::observability::metrics::{COUNTERS_CLOSED, COUNTERS_OPEN, COUNTERS_OPENED, USAGE_FAULTS};

pub mod buckets;
pub mod driver;
pub mod lifecycle;

use buckets::BucketStore;
use driver::ClockDriver;
use lifecycle::{Lifecycle, LifecycleCell};

/// Point-in-time view of a counter, newest bucket first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub counter_id: Uuid,
    pub window_secs: usize,
    pub state: Lifecycle,
    pub current_index: usize,
    pub rolled_over: bool,
    pub buckets: Vec<u64>,
}

pub struct EventCounter {
    id: Uuid,
    window: usize,
    tick_interval: Duration,
    buckets: Arc<BucketStore>,
    driver: Arc<ClockDriver>,
    scheduler: Arc<dyn Scheduler>,
    lifecycle: LifecycleCell,
    // Serialises start/stop and owns the periodic task while open
    ticker: Mutex<Option<Box<dyn ScheduledTask>>>,
}

impl EventCounter {
    /// Creates a counter over the last `window_secs` seconds, ticking on `scheduler`
    /// against the system clock.
    pub fn new(window_secs: i64, scheduler: Arc<dyn Scheduler>) -> Result<Self> {
        Self::with_clock(window_secs, scheduler, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(
        window_secs: i64,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let config = CounterConfig {
            window_secs,
            ..Default::default()
        };
        Self::build(&config, scheduler, clock)
    }

    pub fn from_config(config: &CounterConfig, scheduler: Arc<dyn Scheduler>) -> Result<Self> {
        Self::build(config, scheduler, Arc::new(SystemClock::new()))
    }

    pub fn build(
        config: &CounterConfig,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let window = usize::try_from(config.window_secs).map_err(|_| {
            Error::InvalidArgument(format!("window {} is not addressable", config.window_secs))
        })?;
        let id = Uuid::new_v4();
        let buckets = Arc::new(BucketStore::new(window));
        let driver = Arc::new(ClockDriver::new(id, buckets.clone(), clock));

        Ok(EventCounter {
            id,
            window,
            tick_interval: config.tick_interval(),
            buckets,
            driver,
            scheduler,
            lifecycle: LifecycleCell::new(),
            ticker: Mutex::new(None),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn state(&self) -> Lifecycle {
        self.lifecycle.get()
    }

    /// Opens the counter: captures the start index and launches the clock driver.
    /// Fails with `InvalidState` unless the counter is freshly created.
    pub fn start(&self) -> Result<()> {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        self.expect_state("start", Lifecycle::Created)?;

        let start_index = self.driver.arm();

        let driver = self.driver.clone();
        let task = self.scheduler.schedule_at_fixed_rate(
            &format!("event-counter-{}", self.id),
            self.tick_interval,
            Arc::new(move || {
                driver.fire();
            }),
        );
        let task = match task {
            Ok(task) => task,
            Err(e) => {
                self.driver.halt();
                tracing::error!(counter_id = %self.id, "Failed to schedule clock driver: {}", e);
                return Err(e);
            }
        };
        *ticker = Some(task);

        self.lifecycle
            .transition(Lifecycle::Created, Lifecycle::Open)
            .map_err(|actual| self.usage_fault("start", Lifecycle::Created, actual))?;

        COUNTERS_OPENED.inc();
        COUNTERS_OPEN.inc();
        let _span = crate::observability::tracing::counter_span(&self.id, self.window).entered();
        tracing::info!(start_index, "Event counter opened");
        Ok(())
    }

    /// Closes the counter. Once this returns the clock driver will not mutate the counter
    /// again. Fails with `InvalidState` unless the counter is open.
    pub fn stop(&self) -> Result<()> {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);

        self.lifecycle
            .transition(Lifecycle::Open, Lifecycle::Closed)
            .map_err(|actual| self.usage_fault("stop", Lifecycle::Open, actual))?;

        self.driver.halt();
        if let Some(mut task) = ticker.take() {
            task.cancel();
        }

        COUNTERS_CLOSED.inc();
        COUNTERS_OPEN.dec();
        let _span = crate::observability::tracing::counter_span(&self.id, self.window).entered();
        tracing::info!("Event counter closed");
        Ok(())
    }

    /// Counts one event in the current second's bucket.
    #[inline]
    pub fn record_event(&self) -> Result<()> {
        self.expect_state("record_event", Lifecycle::Open)?;
        self.buckets.increment(self.driver.current_index());
        Ok(())
    }

    /// Number of events recorded in roughly the last `since_secs` seconds.
    ///
    /// Non-positive values yield 0 and values beyond the window are clamped to it.
    /// Concurrent records and ticks may or may not be reflected in the result.
    pub fn count_events(&self, since_secs: i64) -> Result<u64> {
        self.expect_state("count_events", Lifecycle::Open)?;

        if since_secs <= 0 {
            return Ok(0);
        }

        let span = since_secs.min(self.window as i64);
        let current = self.driver.current_index() as i64;
        let window = self.window as i64;

        let count = (0..span)
            .map(|i| self.buckets.get((current - i).rem_euclid(window) as usize))
            .fold(0u64, u64::saturating_add);

        Ok(count)
    }

    pub fn snapshot(&self) -> Result<CounterSnapshot> {
        self.expect_state("snapshot", Lifecycle::Open)?;

        let current = self.driver.current_index();
        let buckets = (0..self.window)
            .map(|i| self.buckets.get((current + self.window - i) % self.window))
            .collect();

        Ok(CounterSnapshot {
            counter_id: self.id,
            window_secs: self.window,
            state: self.state(),
            current_index: current,
            rolled_over: self.driver.has_rolled_over(),
            buckets,
        })
    }

    #[inline]
    fn expect_state(&self, operation: &'static str, expected: Lifecycle) -> Result<()> {
        let actual = self.lifecycle.get();
        if actual == expected {
            Ok(())
        } else {
            Err(self.usage_fault(operation, expected, actual))
        }
    }

    fn usage_fault(&self, operation: &'static str, expected: Lifecycle, actual: Lifecycle) -> Error {
        USAGE_FAULTS.inc();
        tracing::warn!(
            counter_id = %self.id,
            operation,
            state = %actual,
            "Event counter used outside its {} state",
            expected
        );
        Error::InvalidState { operation, expected, actual }
    }
}

impl Drop for EventCounter {
    fn drop(&mut self) {
        if self.lifecycle.get() != Lifecycle::Open {
            return;
        }

        self.driver.halt();
        let ticker = self.ticker.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut task) = ticker.take() {
            task.cancel();
        }
        COUNTERS_OPEN.dec();
        tracing::debug!(counter_id = %self.id, "Open event counter dropped, clock driver cancelled");
    }
}
