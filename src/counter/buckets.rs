use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed-size array of per-second event counters, addressed by `epoch_seconds % window`.
///
/// Every operation is a single atomic instruction. Increments come from callers recording
/// events; resets come only from the clock driver, so no lock is needed.
pub struct BucketStore {
    buckets: Box<[AtomicU64]>,
}

impl BucketStore {
    pub fn new(len: usize) -> Self {
        let buckets: Vec<AtomicU64> = (0..len).map(|_| AtomicU64::new(0)).collect();
        BucketStore {
            buckets: buckets.into_boxed_slice(),
        }
    }

    /// Adds one event to the bucket at `index`. Panics if `index >= len()`.
    #[inline]
    pub fn increment(&self, index: usize) {
        self.buckets[index].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self, index: usize) -> u64 {
        self.buckets[index].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn reset(&self, index: usize) {
        self.buckets[index].store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
