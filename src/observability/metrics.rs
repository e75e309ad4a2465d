use lazy_static::lazy_static;
use prometheus::{IntCounter, IntGauge, Registry};
use crate::error::Result;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Lifecycle metrics
    pub static ref COUNTERS_OPENED: IntCounter = IntCounter::new(
        "event_counters_opened_total",
        "Total number of event counters started"
    ).expect("valid metric definition");

    pub static ref COUNTERS_CLOSED: IntCounter = IntCounter::new(
        "event_counters_closed_total",
        "Total number of event counters stopped"
    ).expect("valid metric definition");

    pub static ref COUNTERS_OPEN: IntGauge = IntGauge::new(
        "event_counters_open",
        "Number of event counters currently open"
    ).expect("valid metric definition");

    // Clock driver metrics
    pub static ref CLOCK_TICKS: IntCounter = IntCounter::new(
        "event_counter_ticks_total",
        "Total number of clock driver firings"
    ).expect("valid metric definition");

    pub static ref BUCKETS_EVICTED: IntCounter = IntCounter::new(
        "event_counter_buckets_evicted_total",
        "Total number of buckets cleared for reuse"
    ).expect("valid metric definition");

    pub static ref WINDOW_ROLLOVERS: IntCounter = IntCounter::new(
        "event_counter_rollovers_total",
        "Total number of counters that completed their first full window cycle"
    ).expect("valid metric definition");

    // Misuse
    pub static ref USAGE_FAULTS: IntCounter = IntCounter::new(
        "event_counter_usage_faults_total",
        "Total number of operations rejected because of the counter's lifecycle state"
    ).expect("valid metric definition");
}

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(COUNTERS_OPENED.clone()))?;
    REGISTRY.register(Box::new(COUNTERS_CLOSED.clone()))?;
    REGISTRY.register(Box::new(COUNTERS_OPEN.clone()))?;
    REGISTRY.register(Box::new(CLOCK_TICKS.clone()))?;
    REGISTRY.register(Box::new(BUCKETS_EVICTED.clone()))?;
    REGISTRY.register(Box::new(WINDOW_ROLLOVERS.clone()))?;
    REGISTRY.register(Box::new(USAGE_FAULTS.clone()))?;
    Ok(())
}
