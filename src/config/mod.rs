use serde::{Deserialize, Serialize};

pub mod counter;
pub mod loader;

pub use counter::CounterConfig;
pub use loader::AppConfig;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Worker threads for the shared tick pool; defaults to the available parallelism.
    pub worker_threads: Option<usize>,
}

impl SchedulerConfig {
    pub fn worker_threads(&self) -> usize {
        self.worker_threads
            .unwrap_or_else(crate::scheduling::tokio_scheduler::default_worker_threads)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}
