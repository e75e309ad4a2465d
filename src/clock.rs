use std::sync::atomic::{AtomicU64, Ordering};
use chrono::Utc;
use crate::interfaces::clock::Clock;

/// Wall clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        SystemClock
    }
}

impl Clock for SystemClock {
    fn epoch_seconds(&self) -> u64 {
        // Pre-epoch system time is treated as the epoch itself
        Utc::now().timestamp().max(0) as u64
    }
}

/// Clock that only moves when told to. Shared between a counter and the code driving it.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(epoch_seconds: u64) -> Self {
        ManualClock {
            now: AtomicU64::new(epoch_seconds),
        }
    }

    pub fn set(&self, epoch_seconds: u64) {
        self.now.store(epoch_seconds, Ordering::SeqCst);
    }

    /// Moves the clock forward and returns the new time.
    pub fn advance(&self, seconds: u64) -> u64 {
        self.now.fetch_add(seconds, Ordering::SeqCst) + seconds
    }
}

impl Clock for ManualClock {
    fn epoch_seconds(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
