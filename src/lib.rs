pub mod clock;
pub mod config;
pub mod counter;
pub mod error;
pub mod interfaces;
pub mod observability;
pub mod scheduling;

pub use crate::clock::{ManualClock, SystemClock};
pub use crate::counter::lifecycle::Lifecycle;
pub use crate::counter::{CounterSnapshot, EventCounter};
pub use crate::error::{Error, Result};
pub use crate::scheduling::{ManualScheduler, TokioScheduler};

// Window used when none is configured: 5 minutes
pub const DEFAULT_WINDOW_SECS: i64 = 300;

// Largest accepted window: one week of per-second buckets
pub const MAX_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;
