use std::sync::Arc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use event_counter::{EventCounter, ManualClock, ManualScheduler};

fn open_counter(window: i64) -> EventCounter {
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let counter = EventCounter::with_clock(window, Arc::new(ManualScheduler::new()), clock).unwrap();
    counter.start().unwrap();
    counter
}

fn bench_record_event(c: &mut Criterion) {
    let counter = open_counter(300);
    c.bench_function("record_event", |b| b.iter(|| counter.record_event().unwrap()));
}

fn bench_count_events(c: &mut Criterion) {
    let counter = open_counter(300);
    for _ in 0..1_000 {
        counter.record_event().unwrap();
    }

    let mut group = c.benchmark_group("count_events");
    for since in [1i64, 30, 300] {
        group.bench_function(format!("since_{}", since), |b| {
            b.iter(|| counter.count_events(black_box(since)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_record_event, bench_count_events);
criterion_main!(benches);
