use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;
use crate::counter::buckets::BucketStore;
use crate::interfaces::clock::Clock;
use crate::observability::metrics::{BUCKETS_EVICTED, CLOCK_TICKS, WINDOW_ROLLOVERS};

/// What a single firing of the driver did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    pub current_index: usize,
    pub evicted: usize,
    pub rolled_over: bool,
}

/// Advances the current bucket once per second and clears buckets as they enter a new cycle.
///
/// The driver is the only writer of the current index and the only caller of
/// [`BucketStore::reset`]. Nothing is cleared until one full window has elapsed since
/// [`arm`](Self::arm): before that, every bucket still holds events from the first cycle.
pub struct ClockDriver {
    counter_id: Uuid,
    window: usize,
    buckets: Arc<BucketStore>,
    clock: Arc<dyn Clock>,
    current_index: AtomicUsize,
    start_index: AtomicUsize,
    start_epoch: AtomicU64,
    last_tick_epoch: AtomicU64,
    rolled_over: AtomicBool,
    // Held for the whole of every firing; `halt` takes it to wait out an in-flight tick
    live: Mutex<bool>,
}

impl ClockDriver {
    pub fn new(
        counter_id: Uuid,
        buckets: Arc<BucketStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ClockDriver {
            counter_id,
            window: buckets.len(),
            buckets,
            clock,
            current_index: AtomicUsize::new(0),
            start_index: AtomicUsize::new(0),
            start_epoch: AtomicU64::new(0),
            last_tick_epoch: AtomicU64::new(0),
            rolled_over: AtomicBool::new(false),
            live: Mutex::new(false),
        }
    }

    /// Captures the start index from the clock and enables firing. Returns the start index.
    pub fn arm(&self) -> usize {
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);

        let now = self.clock.epoch_seconds();
        let index = self.index_for(now);
        self.start_epoch.store(now, Ordering::Release);
        self.last_tick_epoch.store(now, Ordering::Release);
        self.start_index.store(index, Ordering::Release);
        self.current_index.store(index, Ordering::Release);
        self.rolled_over.store(false, Ordering::Release);
        *live = true;

        index
    }

    /// Disables firing. Waits for a firing in progress, so once this returns no tick will
    /// touch the buckets or the current index again.
    pub fn halt(&self) {
        let mut live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        *live = false;
    }

    pub fn is_live(&self) -> bool {
        *self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Entry point for the scheduler. Returns `None` once the driver has been halted.
    pub fn fire(&self) -> Option<TickOutcome> {
        let live = self.live.lock().unwrap_or_else(PoisonError::into_inner);
        if !*live {
            return None;
        }
        let outcome = self.tick();
        drop(live);
        Some(outcome)
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current_index.load(Ordering::Acquire)
    }

    pub fn start_index(&self) -> usize {
        self.start_index.load(Ordering::Acquire)
    }

    pub fn has_rolled_over(&self) -> bool {
        self.rolled_over.load(Ordering::Acquire)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    fn index_for(&self, epoch_seconds: u64) -> usize {
        (epoch_seconds % self.window as u64) as usize
    }

    fn tick(&self) -> TickOutcome {
        CLOCK_TICKS.inc();

        let now = self.clock.epoch_seconds();
        let index = self.index_for(now);
        self.current_index.store(index, Ordering::Release);

        let start_epoch = self.start_epoch.load(Ordering::Acquire);
        let window = self.window as u64;
        let elapsed = now.saturating_sub(start_epoch);

        if (index == self.start_index() || elapsed >= window)
            && !self.rolled_over.swap(true, Ordering::AcqRel)
        {
            WINDOW_ROLLOVERS.inc();
            tracing::info!(
                counter_id = %self.counter_id,
                index,
                elapsed_secs = elapsed,
                "Window rollover reached, eviction enabled"
            );
        }

        let last = self.last_tick_epoch.swap(now, Ordering::AcqRel);
        let mut evicted = 0;

        if self.has_rolled_over() && now > last {
            // Seconds skipped by a late firing never received events of their own,
            // so their buckets only hold data from the previous cycle.
            let first = (last + 1).max(now.saturating_sub(window - 1));
            for second in first..=now {
                if second.saturating_sub(start_epoch) >= window {
                    self.buckets.reset(self.index_for(second));
                    evicted += 1;
                }
            }
        }

        if evicted > 0 {
            BUCKETS_EVICTED.inc_by(evicted as u64);
        }

        tracing::debug!(
            counter_id = %self.counter_id,
            index,
            evicted,
            "Clock tick"
        );

        TickOutcome {
            current_index: index,
            evicted,
            rolled_over: self.has_rolled_over(),
        }
    }
}
