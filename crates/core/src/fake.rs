// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake clock for testing with controllable time.
//!
//! The current virtual time, the pending `after` triggers and the subscriber
//! registry sit behind one lock, so an advance is atomic with respect to
//! `now()`, `after()` and ticker/timer registration.

use crate::clock::Clock;
use crate::error::{require_nonzero, ClockError, PrimitiveKind};
use crate::registry::Registry;
use crate::ticker::FakeTicker;
use crate::timer::FakeTimer;
use crate::trigger::{PendingTrigger, TriggerQueue};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

struct ClockState {
    now: SystemTime,
    triggers: TriggerQueue,
    subscribers: Registry,
    after_args: Vec<Duration>,
    ticker_args: Vec<Duration>,
}

struct Shared {
    state: Mutex<ClockState>,
    /// Signalled whenever a trigger is registered.
    trigger_added: Condvar,
}

/// Fake clock for testing with controllable time
///
/// Clones share the same virtual time.
#[derive(Clone)]
pub struct FakeClock {
    shared: Arc<Shared>,
}

impl FakeClock {
    /// A fake clock starting at the host's current time.
    pub fn new() -> Self {
        Self::at(SystemTime::now())
    }

    /// A fake clock starting at `start`.
    pub fn at(start: SystemTime) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ClockState {
                    now: start,
                    triggers: TriggerQueue::default(),
                    subscribers: Registry::default(),
                    after_args: Vec::new(),
                    ticker_args: Vec::new(),
                }),
                trigger_added: Condvar::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.shared.state.lock()
    }

    /// Set the clock to a specific time without firing anything.
    pub fn set_current(&self, now: SystemTime) {
        self.lock().now = now;
    }

    /// Advance the clock by the given duration.
    ///
    /// In one pass under the clock's lock: fires every due trigger in
    /// deadline order, hands the new time to every ticker, and lets every
    /// timer check its deadline.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.lock();
        Self::advance_locked(&mut state, duration);
    }

    /// Wait until at least one `after` trigger is pending, then advance.
    ///
    /// Avoids racing a thread that is about to call `after`/`sleep`.
    pub fn blocking_advance(&self, duration: Duration) {
        let mut state = self.lock();
        self.shared.trigger_added.wait_while(&mut state, |s| s.triggers.is_empty());
        Self::advance_locked(&mut state, duration);
    }

    /// An advance past the largest representable time is refused and
    /// leaves the clock untouched.
    fn advance_locked(state: &mut ClockState, duration: Duration) {
        let Some(now) = state.now.checked_add(duration) else {
            tracing::warn!(?duration, now = ?state.now, "advance overflows system time, ignored");
            return;
        };
        state.now = now;
        let fired = state.triggers.fire_due(now);
        state.subscribers.notify_all(now);
        tracing::debug!(
            ?duration,
            ?now,
            fired,
            subscribers = state.subscribers.len(),
            "advanced fake clock"
        );
    }

    /// Number of `after` triggers waiting for time to reach their deadline.
    pub fn pending_triggers(&self) -> usize {
        self.lock().triggers.len()
    }

    /// Deadlines of the pending triggers, earliest first.
    pub fn pending_deadlines(&self) -> Vec<SystemTime> {
        self.lock().triggers.deadlines()
    }

    /// Durations passed to `after`, in call order. Clears the record.
    pub fn take_after_args(&self) -> Vec<Duration> {
        std::mem::take(&mut self.lock().after_args)
    }

    /// Durations passed to `new_ticker`, in call order. Clears the record.
    pub fn take_ticker_args(&self) -> Vec<Duration> {
        std::mem::take(&mut self.lock().ticker_args)
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    type Ticker = FakeTicker;
    type Timer = FakeTimer;

    fn now(&self) -> SystemTime {
        self.lock().now
    }

    /// Zero durations fire on the next advance, whatever its size. A
    /// deadline past the largest representable time never fires.
    fn after(&self, duration: Duration) -> Receiver<SystemTime> {
        let mut state = self.lock();
        let rx = match state.now.checked_add(duration) {
            Some(deadline) => {
                let (trigger, rx) = PendingTrigger::new(deadline);
                tracing::trace!(deadline = ?trigger.deadline(), "registered trigger");
                state.triggers.insert(trigger);
                rx
            }
            None => {
                tracing::debug!(?duration, "trigger deadline unrepresentable, never fires");
                state.triggers.hold_unreachable()
            }
        };
        state.after_args.push(duration);
        self.shared.trigger_added.notify_all();
        rx
    }

    fn new_ticker(&self, interval: Duration) -> Result<FakeTicker, ClockError> {
        require_nonzero(interval, PrimitiveKind::Ticker)?;
        let mut state = self.lock();
        let (ticker, subscription) = FakeTicker::spawn(state.now, interval)?;
        state.subscribers.register(Box::new(subscription));
        state.ticker_args.push(interval);
        tracing::debug!(?interval, start = ?state.now, "ticker registered");
        Ok(ticker)
    }

    fn new_timer(&self, duration: Duration) -> Result<FakeTimer, ClockError> {
        require_nonzero(duration, PrimitiveKind::Timer)?;
        let mut state = self.lock();
        let (timer, subscription) = FakeTimer::deliver(state.now, duration)?;
        state.subscribers.register(Box::new(subscription));
        tracing::debug!(?duration, "timer registered");
        Ok(timer)
    }

    fn after_func<F>(&self, duration: Duration, f: F) -> Result<FakeTimer, ClockError>
    where
        F: Fn() + Send + 'static,
    {
        require_nonzero(duration, PrimitiveKind::Timer)?;
        let mut state = self.lock();
        let deadline = state.now.checked_add(duration);
        let (timer, subscription) = FakeTimer::call(state.now, deadline, f)?;
        state.subscribers.register(Box::new(subscription));
        tracing::debug!(?duration, "callback timer registered");
        Ok(timer)
    }

    /// Registered against `deadline` itself under the clock's lock, so no
    /// concurrent advance can shift it. A deadline already reached fires at
    /// once.
    fn after_func_at<F>(&self, deadline: SystemTime, f: F) -> Result<FakeTimer, ClockError>
    where
        F: Fn() + Send + 'static,
    {
        let mut state = self.lock();
        let (timer, subscription) = FakeTimer::call(state.now, Some(deadline), f)?;
        state.subscribers.register(Box::new(subscription));
        tracing::debug!(?deadline, "callback timer registered");
        Ok(timer)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
