use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use dashmap::DashMap;
use lazy_static::lazy_static;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};
use crate::error::{Error, Result};
use crate::interfaces::scheduler::{ScheduledTask, Scheduler, TickFn};

lazy_static! {
    static ref SHARED: std::result::Result<Arc<TokioScheduler>, String> =
        TokioScheduler::new(default_worker_threads())
            .map(Arc::new)
            .map_err(|e| e.to_string());
}

/// Number of worker threads used when none is configured.
pub fn default_worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

enum Executor {
    Owned(Runtime),
    Borrowed(Handle),
}

struct RegisteredTask {
    name: String,
    handle: JoinHandle<()>,
}

type TaskRegistry = Arc<DashMap<u64, RegisteredTask>>;

/// Periodic task scheduler backed by a tokio worker pool
///
/// ## Purpose
/// Runs the once-per-second ticks of any number of counters on a small, shared set of
/// threads, and keeps a registry of the tasks it spawned so their health can be checked.
///
/// ## Usage
/// ```rust,ignore
/// let scheduler = TokioScheduler::shared()?;
/// let counter = EventCounter::new(60, scheduler.clone())?;
/// counter.start()?;
///
/// // Periodically check health
/// if let Err(e) = scheduler.check_health() {
///     error!("Tick task failure detected: {:?}", e);
/// }
/// ```
pub struct TokioScheduler {
    executor: Executor,
    tasks: TaskRegistry,
    next_id: AtomicU64,
}

impl TokioScheduler {
    /// Builds a dedicated multi-threaded runtime with `worker_threads` workers.
    pub fn new(worker_threads: usize) -> Result<Self> {
        if worker_threads == 0 {
            return Err(Error::InvalidArgument(
                "worker_threads must be greater than 0".to_string(),
            ));
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_threads)
            .thread_name("event-counter-tick")
            .enable_time()
            .build()
            .map_err(|e| Error::SchedulerError(format!("failed to build tick runtime: {}", e)))?;

        info!("Tick scheduler started with {} worker threads", worker_threads);

        Ok(Self::with_executor(Executor::Owned(runtime)))
    }

    /// Schedules onto an existing runtime instead of owning one.
    pub fn from_handle(handle: Handle) -> Self {
        Self::with_executor(Executor::Borrowed(handle))
    }

    /// Process-wide scheduler sized to the available parallelism, built on first use.
    pub fn shared() -> Result<Arc<TokioScheduler>> {
        SHARED.clone().map_err(Error::SchedulerError)
    }

    fn with_executor(executor: Executor) -> Self {
        TokioScheduler {
            executor,
            tasks: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    fn handle(&self) -> &Handle {
        match &self.executor {
            Executor::Owned(runtime) => runtime.handle(),
            Executor::Borrowed(handle) => handle,
        }
    }

    /// Returns an error naming every registered task that has terminated unexpectedly.
    /// Terminated tasks are dropped from the registry.
    pub fn check_health(&self) -> Result<()> {
        let failed: Vec<(u64, String)> = self
            .tasks
            .iter()
            .filter(|entry| entry.value().handle.is_finished())
            .map(|entry| (*entry.key(), entry.value().name.clone()))
            .collect();

        if failed.is_empty() {
            return Ok(());
        }

        let names: Vec<String> = failed.iter().map(|(_, name)| name.clone()).collect();
        let error_msg = format!("Tick tasks terminated unexpectedly: {:?}", names);
        error!("{}", error_msg);

        for (id, _) in failed {
            self.tasks.remove(&id);
        }

        Err(Error::SchedulerError(error_msg))
    }

    pub fn active_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Aborts every registered task.
    pub fn shutdown_all(&self) {
        info!("Shutting down {} tick tasks", self.tasks.len());

        let ids: Vec<u64> = self.tasks.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            if let Some((_, task)) = self.tasks.remove(&id) {
                task.handle.abort();
                info!("Aborted tick task: {}", task.name);
            }
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_at_fixed_rate(
        &self,
        name: &str,
        period: Duration,
        task: TickFn,
    ) -> Result<Box<dyn ScheduledTask>> {
        if period.is_zero() {
            return Err(Error::InvalidArgument("tick period must be non-zero".to_string()));
        }

        let handle = self.handle().spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                task();
            }
        });

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let abort = handle.abort_handle();
        self.tasks.insert(id, RegisteredTask { name: name.to_string(), handle });

        info!("Scheduled tick task: {} every {:?}", name, period);

        Ok(Box::new(TokioTask {
            id,
            abort,
            registry: self.tasks.clone(),
            cancelled: AtomicBool::new(false),
        }))
    }
}

struct TokioTask {
    id: u64,
    abort: tokio::task::AbortHandle,
    registry: TaskRegistry,
    cancelled: AtomicBool,
}

impl ScheduledTask for TokioTask {
    fn cancel(&mut self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        self.abort.abort();
        if let Some((_, task)) = self.registry.remove(&self.id) {
            info!("Cancelled tick task: {}", task.name);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
