use std::sync::Arc;
use std::thread;
use std::time::Duration;
use anyhow::Context;
use event_counter::config::AppConfig;
use event_counter::observability::metrics::register_metrics;
use event_counter::observability::tracing::init_tracing;
use event_counter::{EventCounter, TokioScheduler};

fn main() -> anyhow::Result<()> {
    let env = std::env::var("EVENT_COUNTER_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    init_tracing(&config.logging)?;
    register_metrics()?;

    let scheduler = Arc::new(TokioScheduler::new(config.scheduler.worker_threads())?);
    let counter = EventCounter::from_config(&config.counter, scheduler.clone())?;
    counter.start()?;

    for batch in 1..=3 {
        for _ in 0..batch * 10 {
            counter.record_event()?;
        }
        tracing::info!(
            batch,
            last_second = counter.count_events(1)?,
            whole_window = counter.count_events(i64::MAX)?,
            "Recorded batch"
        );
        thread::sleep(Duration::from_secs(1));
    }

    scheduler.check_health()?;
    println!("{}", serde_json::to_string_pretty(&counter.snapshot()?)?);

    counter.stop()?;
    Ok(())
}
