// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling

use crate::error::ClockError;
use crate::system::{SystemTicker, SystemTimer};
use crate::ticker::Ticker;
use crate::timer::Timer;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, SystemTime};

/// A clock that provides the current time and time-driven primitives.
///
/// Production code takes a `C: Clock` and is handed a [`SystemClock`];
/// tests hand it a [`FakeClock`](crate::FakeClock) and move time explicitly.
pub trait Clock: Clone + Send + Sync {
    type Ticker: Ticker;
    type Timer: Timer;

    fn now(&self) -> SystemTime;

    /// Time elapsed since `t`, or zero if `t` is in the future.
    fn since(&self, t: SystemTime) -> Duration {
        self.now().duration_since(t).unwrap_or_default()
    }

    /// Time remaining until `t`, or zero if `t` has passed.
    fn until(&self, t: SystemTime) -> Duration {
        t.duration_since(self.now()).unwrap_or_default()
    }

    /// A channel that receives a time value once `duration` has elapsed.
    fn after(&self, duration: Duration) -> Receiver<SystemTime>;

    /// Block the calling thread until `duration` has elapsed.
    fn sleep(&self, duration: Duration) {
        let _ = self.after(duration).recv();
    }

    /// A ticker firing every `interval`. Zero intervals are rejected.
    fn new_ticker(&self, interval: Duration) -> Result<Self::Ticker, ClockError>;

    /// A timer firing once after `duration`. Zero durations are rejected.
    fn new_timer(&self, duration: Duration) -> Result<Self::Timer, ClockError>;

    /// A timer that calls `f` on a background thread each time it fires
    /// instead of sending on its channel.
    fn after_func<F>(&self, duration: Duration, f: F) -> Result<Self::Timer, ClockError>
    where
        F: Fn() + Send + 'static;

    /// Like [`after_func`](Self::after_func), but firing at an absolute
    /// `deadline`. A deadline already reached fires as soon as possible.
    fn after_func_at<F>(&self, deadline: SystemTime, f: F) -> Result<Self::Timer, ClockError>
    where
        F: Fn() + Send + 'static,
    {
        let remaining = self.until(deadline).max(Duration::from_nanos(1));
        self.after_func(remaining, f)
    }
}

/// Real system clock
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Ticker = SystemTicker;
    type Timer = SystemTimer;

    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn after(&self, duration: Duration) -> Receiver<SystemTime> {
        let (tx, rx) = mpsc::sync_channel(1);
        std::thread::spawn(move || {
            std::thread::sleep(duration);
            let _ = tx.try_send(SystemTime::now());
        });
        rx
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn new_ticker(&self, interval: Duration) -> Result<SystemTicker, ClockError> {
        SystemTicker::start(interval)
    }

    fn new_timer(&self, duration: Duration) -> Result<SystemTimer, ClockError> {
        SystemTimer::deliver(duration)
    }

    fn after_func<F>(&self, duration: Duration, f: F) -> Result<SystemTimer, ClockError>
    where
        F: Fn() + Send + 'static,
    {
        SystemTimer::call(duration, f)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
