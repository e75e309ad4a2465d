use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use event_counter::interfaces::scheduler::Scheduler;
use event_counter::{Error, EventCounter, Lifecycle, TokioScheduler};

fn counting_task(hits: &Arc<AtomicUsize>) -> Arc<dyn Fn() + Send + Sync> {
    let hits = hits.clone();
    Arc::new(move || {
        hits.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fires_periodically_until_cancelled() {
    let scheduler = TokioScheduler::from_handle(Handle::current());
    let hits = Arc::new(AtomicUsize::new(0));

    let mut task = scheduler
        .schedule_at_fixed_rate("fast", Duration::from_millis(20), counting_task(&hits))
        .unwrap();
    assert_eq!(scheduler.active_task_count(), 1);

    tokio::time::sleep(Duration::from_millis(250)).await;
    task.cancel();
    assert!(task.is_cancelled());
    assert_eq!(scheduler.active_task_count(), 0);

    // Let an in-flight firing finish before sampling
    tokio::time::sleep(Duration::from_millis(50)).await;
    let fired = hits.load(Ordering::SeqCst);
    assert!(fired >= 3, "fired only {} times", fired);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(hits.load(Ordering::SeqCst), fired);
}

#[tokio::test]
async fn first_firing_waits_one_period() {
    let scheduler = TokioScheduler::from_handle(Handle::current());
    let hits = Arc::new(AtomicUsize::new(0));

    let mut task = scheduler
        .schedule_at_fixed_rate("slow", Duration::from_secs(60), counting_task(&hits))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    task.cancel();
}

fn broken_tick() {
    panic!("tick failed");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_task_is_reported_unhealthy() {
    let scheduler = TokioScheduler::from_handle(Handle::current());
    let _task = scheduler
        .schedule_at_fixed_rate("broken", Duration::from_millis(10), Arc::new(broken_tick))
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(matches!(scheduler.check_health(), Err(Error::SchedulerError(_))));
    assert_eq!(scheduler.active_task_count(), 0);
    assert!(scheduler.check_health().is_ok());
}

#[tokio::test]
async fn shutdown_all_aborts_every_task() {
    let scheduler = TokioScheduler::from_handle(Handle::current());
    let hits = Arc::new(AtomicUsize::new(0));
    let _a = scheduler
        .schedule_at_fixed_rate("a", Duration::from_secs(1), counting_task(&hits))
        .unwrap();
    let _b = scheduler
        .schedule_at_fixed_rate("b", Duration::from_secs(1), counting_task(&hits))
        .unwrap();

    assert_eq!(scheduler.active_task_count(), 2);
    scheduler.shutdown_all();
    assert_eq!(scheduler.active_task_count(), 0);
}

#[test]
fn zero_worker_threads_is_rejected() {
    assert!(matches!(TokioScheduler::new(0), Err(Error::InvalidArgument(_))));
}

#[test]
fn counter_on_real_clock_evicts_after_window() {
    let scheduler = TokioScheduler::shared().unwrap();
    let counter = EventCounter::new(2, scheduler).unwrap();
    counter.start().unwrap();

    for _ in 0..5 {
        counter.record_event().unwrap();
    }
    assert_eq!(counter.count_events(2).unwrap(), 5);

    // Two seconds to roll over, plus slack for a late firing
    std::thread::sleep(Duration::from_millis(4500));
    assert_eq!(counter.count_events(2).unwrap(), 0);

    counter.stop().unwrap();
    assert_eq!(counter.state(), Lifecycle::Closed);
}

#[test]
fn shared_scheduler_is_one_instance() {
    let a = TokioScheduler::shared().unwrap();
    let b = TokioScheduler::shared().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}
