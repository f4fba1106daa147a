//! Advance specs
//!
//! Virtual time moves only when told to, by exactly the requested amount.

use crate::prelude::*;

#[test]
fn now_is_start_plus_every_advance() {
    let clock = FakeClock::at(at(1_000));
    let steps = [millis(1), secs(59), Duration::ZERO, secs(3_600), millis(999)];
    for step in steps {
        clock.advance(step);
    }
    let total: Duration = steps.iter().sum();
    assert_eq!(clock.now(), at(1_000) + total);
}

#[test]
fn time_does_not_move_on_its_own() {
    let clock = epoch_clock();
    std::thread::sleep(millis(10));
    assert_eq!(clock.now(), at(0));
}

#[test]
fn set_current_jumps_without_firing() {
    let clock = epoch_clock();
    let after = clock.after(secs(1));
    let ticker = clock.new_ticker(secs(1)).unwrap();

    clock.set_current(at(100));
    assert_eq!(clock.now(), at(100));
    assert!(after.try_recv().is_err());
    assert_quiet(ticker.chan());
}

#[test]
fn blocking_advance_waits_for_a_sleeper() {
    let clock = epoch_clock();
    let sleeper = clock.clone();
    let woke = std::thread::spawn(move || {
        sleeper.sleep(secs(1));
        sleeper.now()
    });

    clock.blocking_advance(secs(1));
    assert_eq!(woke.join().unwrap(), at(1));
}
