// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot timers driven by virtual time.
//!
//! A [`FakeTimer`] keeps its own notion of "now", updated by every advance of
//! the clock it was created on. The fire decision is made synchronously in
//! the clock's advance step under the timer's own lock; the resulting fire
//! event is posted to the timer's dispatcher thread, which either performs
//! the blocking send on the timer's channel or calls the user's callback.

use crate::error::{require_nonzero, ClockError, PrimitiveKind};
use crate::registry::Subscriber;
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// A one-shot time source that can be stopped and rescheduled.
pub trait Timer: Send {
    /// The channel the timer delivers on. Never receives for callback timers.
    fn chan(&self) -> &Receiver<SystemTime>;

    /// Reschedule to fire `duration` from the timer's current time.
    ///
    /// Returns whether the timer was still scheduled. A fired or stopped
    /// timer is rearmed all the same.
    fn reset(&self, duration: Duration) -> bool;

    /// Stop the timer. Returns whether it was still scheduled.
    fn stop(&self) -> bool;
}

/// Lifecycle of a timer. `Fired` and `Stopped` are terminal until a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Scheduled,
    Fired,
    Stopped,
}

crate::simple_display! {
    TimerPhase {
        Scheduled => "scheduled",
        Fired => "fired",
        Stopped => "stopped",
    }
}

#[derive(Debug)]
struct TimerState {
    now: SystemTime,
    /// `None` when the deadline lies beyond the largest representable time.
    deadline: Option<SystemTime>,
    phase: TimerPhase,
}

impl TimerState {
    /// Transition to `Fired` if the deadline has been reached.
    fn try_fire(&mut self) -> Option<SystemTime> {
        let deadline = self.deadline.filter(|d| *d <= self.now)?;
        if self.phase != TimerPhase::Scheduled {
            return None;
        }
        self.phase = TimerPhase::Fired;
        Some(deadline)
    }
}

/// What the dispatcher does with a fire event.
enum FireAction {
    Deliver(SyncSender<SystemTime>),
    Call(Box<dyn Fn() + Send>),
}

/// State shared by the timer handle and the clock's registry entry.
struct TimerCore {
    state: Mutex<TimerState>,
    fires: Sender<SystemTime>,
    /// Direct line to the timer's channel for `blocking_advance`.
    direct: Option<SyncSender<SystemTime>>,
}

impl TimerCore {
    fn observe(&self, now: SystemTime) {
        let fired = {
            let mut state = self.state.lock();
            state.now = now;
            state.try_fire()
        };
        if let Some(deadline) = fired {
            self.post(deadline);
        }
    }

    fn post(&self, deadline: SystemTime) {
        tracing::debug!(?deadline, "timer fired");
        if self.fires.send(deadline).is_err() {
            tracing::trace!("timer dispatcher gone");
        }
    }

    fn is_callback(&self) -> bool {
        self.direct.is_none()
    }

    fn blocking_advance(&self, duration: Duration) {
        let fired = {
            let mut state = self.state.lock();
            let Some(now) = state.now.checked_add(duration) else {
                tracing::warn!(?duration, "timer advance overflows system time, ignored");
                return;
            };
            state.now = now;
            state.try_fire()
        };
        let Some(deadline) = fired else {
            return;
        };
        match &self.direct {
            Some(tx) => {
                tracing::debug!(?deadline, "timer fired by blocking advance");
                let _ = tx.send(deadline);
            }
            None => self.post(deadline),
        }
    }
}

/// The clock's side of a timer.
pub(crate) struct TimerSubscription {
    core: Arc<TimerCore>,
}

impl Subscriber for TimerSubscription {
    fn notify(&mut self, now: SystemTime) -> bool {
        self.core.observe(now);
        if Arc::strong_count(&self.core) > 1 {
            return true;
        }
        // No handle left: only a scheduled callback can still do anything.
        self.core.is_callback() && self.core.state.lock().phase == TimerPhase::Scheduled
    }
}

/// A timer tied to a [`FakeClock`](crate::FakeClock)'s virtual time.
pub struct FakeTimer {
    core: Arc<TimerCore>,
    rx: Receiver<SystemTime>,
    /// Keeps a callback timer's channel open so receivers block instead of
    /// seeing a disconnect.
    _idle: Option<SyncSender<SystemTime>>,
}

impl FakeTimer {
    /// A timer on its own, not tied to any clock.
    ///
    /// Its time starts at `now` and moves only through
    /// [`blocking_advance`](Self::blocking_advance).
    pub fn at(now: SystemTime, duration: Duration) -> Result<Self, ClockError> {
        require_nonzero(duration, PrimitiveKind::Timer)?;
        let (timer, _subscription) = Self::deliver(now, duration)?;
        Ok(timer)
    }

    /// A standalone timer starting at the host's current time.
    pub fn new(duration: Duration) -> Result<Self, ClockError> {
        Self::at(SystemTime::now(), duration)
    }

    /// A timer that sends its deadline on its channel when it fires.
    pub(crate) fn deliver(
        now: SystemTime,
        duration: Duration,
    ) -> Result<(Self, TimerSubscription), ClockError> {
        let (tx, rx) = mpsc::sync_channel(0);
        let direct = Some(tx.clone());
        let deadline = now.checked_add(duration);
        Self::spawn(now, deadline, FireAction::Deliver(tx), direct, rx, None)
    }

    /// A timer that calls `f` on its dispatcher thread when it fires.
    pub(crate) fn call<F>(
        now: SystemTime,
        deadline: Option<SystemTime>,
        f: F,
    ) -> Result<(Self, TimerSubscription), ClockError>
    where
        F: Fn() + Send + 'static,
    {
        let (idle, rx) = mpsc::sync_channel(0);
        Self::spawn(now, deadline, FireAction::Call(Box::new(f)), None, rx, Some(idle))
    }

    /// A deadline already reached at `now` fires straight away.
    fn spawn(
        now: SystemTime,
        deadline: Option<SystemTime>,
        action: FireAction,
        direct: Option<SyncSender<SystemTime>>,
        rx: Receiver<SystemTime>,
        idle: Option<SyncSender<SystemTime>>,
    ) -> Result<(Self, TimerSubscription), ClockError> {
        let (fires_tx, fires_rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("vtime-timer".to_string())
            .spawn(move || dispatch(fires_rx, action))
            .map_err(|source| ClockError::Spawn { kind: PrimitiveKind::Timer, source })?;

        let mut state = TimerState { now, deadline, phase: TimerPhase::Scheduled };
        let fired = state.try_fire();
        let core = Arc::new(TimerCore { state: Mutex::new(state), fires: fires_tx, direct });
        if let Some(deadline) = fired {
            core.post(deadline);
        }
        let subscription = TimerSubscription { core: Arc::clone(&core) };
        Ok((Self { core, rx, _idle: idle }, subscription))
    }

    pub fn phase(&self) -> TimerPhase {
        self.core.state.lock().phase
    }

    /// `None` if the deadline lies beyond the largest representable time.
    pub fn deadline(&self) -> Option<SystemTime> {
        self.core.state.lock().deadline
    }

    /// The timer's own view of the current time.
    pub fn now(&self) -> SystemTime {
        self.core.state.lock().now
    }

    /// Bump only this timer's time by `duration`.
    ///
    /// If that reaches the deadline, a channel timer sends from the calling
    /// thread and this returns only once a reader has received the value.
    /// Callback timers hand the fire to their dispatcher and return at once.
    pub fn blocking_advance(&self, duration: Duration) {
        self.core.blocking_advance(duration);
    }

    /// A handle that can drive [`blocking_advance`](Self::blocking_advance)
    /// from another thread while this one reads the channel.
    pub fn advancer(&self) -> TimerAdvancer {
        TimerAdvancer { core: Arc::clone(&self.core) }
    }
}

/// Drives a [`FakeTimer`]'s private time from another thread.
#[derive(Clone)]
pub struct TimerAdvancer {
    core: Arc<TimerCore>,
}

impl TimerAdvancer {
    pub fn blocking_advance(&self, duration: Duration) {
        self.core.blocking_advance(duration);
    }
}

impl Timer for FakeTimer {
    fn chan(&self) -> &Receiver<SystemTime> {
        &self.rx
    }

    fn reset(&self, duration: Duration) -> bool {
        let (was_running, fired) = {
            let mut state = self.core.state.lock();
            let was_running = state.phase == TimerPhase::Scheduled;
            state.deadline = state.now.checked_add(duration);
            state.phase = TimerPhase::Scheduled;
            (was_running, state.try_fire())
        };
        tracing::debug!(?duration, was_running, "timer reset");
        if let Some(deadline) = fired {
            self.core.post(deadline);
        }
        was_running
    }

    fn stop(&self) -> bool {
        let mut state = self.core.state.lock();
        if state.phase != TimerPhase::Scheduled {
            return false;
        }
        state.phase = TimerPhase::Stopped;
        tracing::debug!(deadline = ?state.deadline, "timer stopped");
        true
    }
}

/// Dispatcher loop: runs until the timer's core is dropped.
fn dispatch(fires: Receiver<SystemTime>, action: FireAction) {
    for deadline in fires.iter() {
        match &action {
            FireAction::Deliver(tx) => {
                // Blocks until a reader takes the value.
                if tx.send(deadline).is_err() {
                    break;
                }
            }
            FireAction::Call(f) => f(),
        }
    }
    tracing::trace!("timer dispatcher exiting");
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
