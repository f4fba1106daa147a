//! Timer specs
//!
//! Timers fire once per schedule, report whether they were running on
//! stop/reset, and either deliver their deadline or call back.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::prelude::*;

#[test]
fn fires_once_at_deadline() {
    let clock = epoch_clock();
    let timer = clock.new_timer(secs(1)).unwrap();

    clock.advance(secs(1));
    expect_recv(timer.chan(), at(1));
    clock.advance(secs(1));
    assert_quiet(timer.chan());
}

#[test]
fn reset_after_fire_restarts_and_reports_not_running() {
    let clock = epoch_clock();
    let timer = clock.new_timer(secs(1)).unwrap();
    clock.advance(secs(1));
    expect_recv(timer.chan(), at(1));

    assert!(!timer.reset(secs(2)));
    assert_eq!(timer.phase(), TimerPhase::Scheduled);
    clock.advance(secs(2));
    expect_recv(timer.chan(), at(3));
}

#[test]
fn reset_while_pending_reports_running() {
    let clock = epoch_clock();
    let timer = clock.new_timer(secs(1)).unwrap();
    assert!(timer.reset(secs(5)));
    clock.advance(secs(1));
    assert_quiet(timer.chan());
}

#[test]
fn stop_reports_only_the_first_time() {
    let clock = epoch_clock();
    let timer = clock.new_timer(secs(1)).unwrap();
    assert!(timer.stop());
    assert!(!timer.stop());
}

#[test]
fn stop_after_fire_reports_false() {
    let clock = epoch_clock();
    let timer = clock.new_timer(secs(1)).unwrap();
    clock.advance(secs(1));
    assert!(!timer.stop());
    expect_recv(timer.chan(), at(1));
}

#[test]
fn callback_runs_off_the_advancing_thread() {
    let clock = epoch_clock();
    let calls = Arc::new(AtomicU32::new(0));
    let hook = Arc::clone(&calls);
    let caller = std::thread::current().id();
    let timer = clock
        .after_func(secs(1), move || {
            assert_ne!(std::thread::current().id(), caller);
            hook.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    clock.advance(secs(1));
    assert!(eventually(|| calls.load(Ordering::SeqCst) == 1));
    assert!(timer.chan().try_recv().is_err());

    clock.advance(secs(5));
    assert!(consistently(|| calls.load(Ordering::SeqCst) == 1));
}

#[test]
fn blocking_advance_returns_after_the_read() {
    let clock = epoch_clock();
    let timer = clock.new_timer(secs(1)).unwrap();
    let advancer = timer.advancer();

    let done = std::thread::spawn(move || advancer.blocking_advance(secs(1)));
    expect_recv(timer.chan(), at(1));
    done.join().unwrap();
    assert_eq!(timer.phase(), TimerPhase::Fired);
}

#[test]
fn standalone_timer_runs_on_its_own_time() {
    let timer = FakeTimer::at(at(100), secs(2)).unwrap();
    let advancer = timer.advancer();

    let done = std::thread::spawn(move || {
        advancer.blocking_advance(secs(1));
        advancer.blocking_advance(secs(1));
    });
    expect_recv(timer.chan(), at(102));
    done.join().unwrap();
    assert_eq!(timer.now(), at(102));
}

#[test]
fn max_duration_timer_stays_scheduled() {
    let clock = epoch_clock();
    let timer = clock.new_timer(Duration::MAX).unwrap();
    clock.advance(secs(1_000_000));
    assert_quiet(timer.chan());
    assert_eq!(timer.phase(), TimerPhase::Scheduled);
}
