//! After specs
//!
//! One-shot triggers fire once, with their deadline, in deadline order.

use crate::prelude::*;

#[test]
fn fires_once_when_time_reaches_deadline() {
    let clock = epoch_clock();
    let after = clock.after(secs(1));

    clock.advance(millis(500));
    assert!(after.try_recv().is_err());

    clock.advance(millis(500));
    assert_eq!(after.try_recv().unwrap(), at(1));

    for _ in 0..3 {
        clock.advance(secs(1));
        assert!(after.try_recv().is_err());
    }
}

#[test]
fn far_jump_delivers_the_deadline() {
    let clock = epoch_clock();
    let after = clock.after(millis(1_500));
    clock.advance(secs(3_600));
    assert_eq!(after.try_recv().unwrap(), at_millis(1_500));
}

#[test]
fn distinct_deadlines_each_fire_once() {
    let clock = epoch_clock();
    let offsets = [7, 3, 9, 1, 5];
    let receivers: Vec<_> = offsets.iter().map(|&s| (s, clock.after(secs(s)))).collect();

    clock.advance(secs(10));
    assert_eq!(clock.pending_triggers(), 0);
    for (offset, rx) in receivers {
        assert_eq!(rx.try_recv().unwrap(), at(offset));
        assert!(rx.try_recv().is_err());
    }
}

#[test]
fn pending_set_is_sorted_and_shrinks_as_triggers_fire() {
    let clock = epoch_clock();
    clock.after(secs(15));
    clock.after(secs(5));
    clock.after(secs(10));
    clock.after(secs(5));
    assert_eq!(clock.pending_deadlines(), vec![at(5), at(5), at(10), at(15)]);

    clock.advance(secs(6));
    assert_eq!(clock.pending_deadlines(), vec![at(10), at(15)]);
    clock.advance(secs(9));
    assert!(clock.pending_deadlines().is_empty());
}

#[test]
fn records_requested_durations() {
    let clock = epoch_clock();
    clock.after(secs(2));
    clock.after(Duration::ZERO);
    assert_eq!(clock.take_after_args(), vec![secs(2), Duration::ZERO]);
}

#[test]
fn max_duration_never_fires_and_time_never_overflows() {
    let clock = epoch_clock();
    let never = clock.after(Duration::MAX);

    clock.advance(Duration::MAX);
    assert_eq!(clock.now(), at(0));
    clock.advance(secs(1_000_000));
    assert!(never.try_recv().is_err());
    assert_eq!(clock.pending_triggers(), 1);
}
