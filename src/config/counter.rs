use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CounterConfig {
    pub window_secs: i64,
    pub tick_interval_ms: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        CounterConfig {
            window_secs: crate::DEFAULT_WINDOW_SECS,  // 5 minutes
            tick_interval_ms: 1000,
        }
    }
}

impl CounterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_secs <= 0 {
            return Err(Error::InvalidArgument(format!(
                "window must be greater than 0 seconds, got {}",
                self.window_secs
            )));
        }
        if self.window_secs > crate::MAX_WINDOW_SECS {
            return Err(Error::InvalidArgument(format!(
                "window must be at most {} seconds, got {}",
                crate::MAX_WINDOW_SECS,
                self.window_secs
            )));
        }
        // Faster ticks only reduce boundary skew; slower ones would delay eviction
        if self.tick_interval_ms == 0 || self.tick_interval_ms > 1000 {
            return Err(Error::InvalidArgument(format!(
                "tick_interval_ms must be within 1..=1000, got {}",
                self.tick_interval_ms
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
