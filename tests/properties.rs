use std::sync::Arc;
use proptest::prelude::*;
use event_counter::{EventCounter, ManualClock, ManualScheduler};

const EPOCH: u64 = 1_700_000_000;

/// Opens a counter and replays `history`: `history[i]` events during the i-th second.
fn replay(window: i64, start_offset: u64, history: &[u64]) -> (EventCounter, Arc<ManualClock>, Arc<ManualScheduler>) {
    let clock = Arc::new(ManualClock::new(EPOCH + start_offset));
    let scheduler = Arc::new(ManualScheduler::new());
    let counter = EventCounter::with_clock(window, scheduler.clone(), clock.clone()).unwrap();
    counter.start().unwrap();

    for (i, events) in history.iter().enumerate() {
        if i > 0 {
            clock.advance(1);
            scheduler.fire_all();
        }
        for _ in 0..*events {
            counter.record_event().unwrap();
        }
    }
    (counter, clock, scheduler)
}

fn window_and_history() -> impl Strategy<Value = (i64, u64, Vec<u64>)> {
    (1i64..=60, 0u64..120).prop_flat_map(|(window, offset)| {
        (
            Just(window),
            Just(offset),
            prop::collection::vec(0u64..20, 1..=window as usize),
        )
    })
}

proptest! {
    #[test]
    fn non_positive_queries_are_zero(
        (window, offset, history) in window_and_history(),
        since in i64::MIN..=0,
    ) {
        let (counter, _, _) = replay(window, offset, &history);
        prop_assert_eq!(counter.count_events(since).unwrap(), 0);
    }

    #[test]
    fn full_window_counts_everything_within_first_cycle(
        (window, offset, history) in window_and_history(),
        beyond in 0i64..10_000,
    ) {
        let (counter, _, _) = replay(window, offset, &history);
        let total: u64 = history.iter().sum();
        prop_assert_eq!(counter.count_events(window).unwrap(), total);
        prop_assert_eq!(counter.count_events(window + beyond).unwrap(), total);
    }

    #[test]
    fn counts_grow_with_the_query_span(
        (window, offset, history) in window_and_history(),
    ) {
        let (counter, _, _) = replay(window, offset, &history);
        let counts: Vec<u64> = (0..=window)
            .map(|since| counter.count_events(since).unwrap())
            .collect();
        prop_assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]));

        // The trailing `since` seconds are exactly the last `since` entries of the history
        for since in 0..=history.len() {
            let expected: u64 = history[history.len() - since..].iter().sum();
            prop_assert_eq!(counts[since], expected);
        }
    }

    #[test]
    fn idle_window_after_rollover_evicts_everything(
        (window, offset, history) in window_and_history(),
        extra_cycles in 0u64..3,
    ) {
        let (counter, clock, scheduler) = replay(window, offset, &history);
        for _ in 0..(window as u64 * (1 + extra_cycles) + 1) {
            clock.advance(1);
            scheduler.fire_all();
        }
        prop_assert_eq!(counter.count_events(window).unwrap(), 0);
    }

    #[test]
    fn late_ticks_never_leak_old_events(
        (window, offset, history) in window_and_history(),
        gap in 1u64..200,
    ) {
        let (counter, clock, scheduler) = replay(window, offset, &history);
        // A single delayed firing after a long stall
        clock.advance(gap);
        scheduler.fire_all();

        // Only seconds newer than one window before now may still be counted
        let cutoff = (history.len() + gap as usize).saturating_sub(window as usize);
        let expected: u64 = history[cutoff.min(history.len())..].iter().sum();
        prop_assert_eq!(counter.count_events(window).unwrap(), expected);
    }
}
