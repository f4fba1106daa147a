// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real tickers and timers backing [`SystemClock`](crate::SystemClock).
//!
//! Each runs on its own thread and waits on a condition variable until its
//! next deadline, so stop/reset take effect without waiting out a sleep.
//! Both deliver through a capacity-1 buffer and drop a value when the
//! buffer is still full, like the host's own timers.

use crate::error::{require_nonzero, ClockError, PrimitiveKind};
use crate::ticker::Ticker;
use crate::timer::{Timer, TimerPhase};
use parking_lot::{Condvar, Mutex};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

// ── Ticker ──────────────────────────────────────────────────────────────────

struct TickerSignal {
    stopped: Mutex<bool>,
    changed: Condvar,
}

pub struct SystemTicker {
    ticks: Receiver<SystemTime>,
    signal: Arc<TickerSignal>,
}

impl SystemTicker {
    pub(crate) fn start(interval: Duration) -> Result<Self, ClockError> {
        require_nonzero(interval, PrimitiveKind::Ticker)?;
        let (tx, rx) = mpsc::sync_channel(1);
        let signal = Arc::new(TickerSignal { stopped: Mutex::new(false), changed: Condvar::new() });
        let worker_signal = Arc::clone(&signal);
        std::thread::Builder::new()
            .name("vtime-system-ticker".to_string())
            .spawn(move || run_ticker(interval, tx, &worker_signal))
            .map_err(|source| ClockError::Spawn { kind: PrimitiveKind::Ticker, source })?;
        Ok(Self { ticks: rx, signal })
    }
}

/// A next tick past the largest representable instant is `None`; the
/// thread then only waits for stop.
fn run_ticker(interval: Duration, tx: SyncSender<SystemTime>, signal: &TickerSignal) {
    let mut next = Instant::now().checked_add(interval);
    let mut stopped = signal.stopped.lock();
    loop {
        match next {
            Some(at) => {
                while !*stopped && Instant::now() < at {
                    signal.changed.wait_until(&mut stopped, at);
                }
            }
            None => {
                while !*stopped {
                    signal.changed.wait(&mut stopped);
                }
            }
        }
        if *stopped {
            break;
        }
        match tx.try_send(SystemTime::now()) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => break,
        }
        // Skip boundaries missed while the thread was descheduled.
        let now = Instant::now();
        while let Some(at) = next.filter(|at| *at <= now) {
            next = at.checked_add(interval);
        }
    }
}

impl Ticker for SystemTicker {
    fn chan(&self) -> &Receiver<SystemTime> {
        &self.ticks
    }

    fn stop(&self) {
        *self.signal.stopped.lock() = true;
        self.signal.changed.notify_all();
    }
}

impl Drop for SystemTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Timer ───────────────────────────────────────────────────────────────────

struct RealTimerState {
    /// `None` when the deadline lies beyond the largest representable instant.
    deadline: Option<Instant>,
    phase: TimerPhase,
    /// The handle is gone; exit once nothing is scheduled.
    detached: bool,
}

struct RealTimerShared {
    state: Mutex<RealTimerState>,
    changed: Condvar,
}

enum RealFire {
    Deliver(SyncSender<SystemTime>),
    Call(Box<dyn Fn() + Send>),
}

pub struct SystemTimer {
    shared: Arc<RealTimerShared>,
    rx: Receiver<SystemTime>,
    _idle: Option<SyncSender<SystemTime>>,
    callback: bool,
}

impl SystemTimer {
    pub(crate) fn deliver(duration: Duration) -> Result<Self, ClockError> {
        let (tx, rx) = mpsc::sync_channel(1);
        Self::start(duration, RealFire::Deliver(tx), rx, None)
    }

    pub(crate) fn call<F>(duration: Duration, f: F) -> Result<Self, ClockError>
    where
        F: Fn() + Send + 'static,
    {
        let (idle, rx) = mpsc::sync_channel(0);
        Self::start(duration, RealFire::Call(Box::new(f)), rx, Some(idle))
    }

    fn start(
        duration: Duration,
        fire: RealFire,
        rx: Receiver<SystemTime>,
        idle: Option<SyncSender<SystemTime>>,
    ) -> Result<Self, ClockError> {
        require_nonzero(duration, PrimitiveKind::Timer)?;
        let callback = matches!(fire, RealFire::Call(_));
        let shared = Arc::new(RealTimerShared {
            state: Mutex::new(RealTimerState {
                deadline: Instant::now().checked_add(duration),
                phase: TimerPhase::Scheduled,
                detached: false,
            }),
            changed: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        std::thread::Builder::new()
            .name("vtime-system-timer".to_string())
            .spawn(move || run_timer(&worker_shared, fire))
            .map_err(|source| ClockError::Spawn { kind: PrimitiveKind::Timer, source })?;
        Ok(Self { shared, rx, _idle: idle, callback })
    }
}

fn run_timer(shared: &RealTimerShared, fire: RealFire) {
    let mut state = shared.state.lock();
    loop {
        match (state.phase, state.deadline) {
            (TimerPhase::Scheduled, Some(deadline)) if Instant::now() >= deadline => {
                state.phase = TimerPhase::Fired;
                // Fire without holding the lock so stop/reset stay responsive.
                drop(state);
                match &fire {
                    RealFire::Deliver(tx) => {
                        if let Err(TrySendError::Disconnected(_)) = tx.try_send(SystemTime::now()) {
                            return;
                        }
                    }
                    RealFire::Call(f) => f(),
                }
                state = shared.state.lock();
            }
            (TimerPhase::Scheduled, Some(deadline)) => {
                shared.changed.wait_until(&mut state, deadline);
            }
            // Unreachable deadline: only a reset or stop can change anything.
            (TimerPhase::Scheduled, None) => {
                if state.detached {
                    return;
                }
                shared.changed.wait(&mut state);
            }
            (TimerPhase::Fired | TimerPhase::Stopped, _) => {
                if state.detached {
                    return;
                }
                shared.changed.wait(&mut state);
            }
        }
    }
}

impl Timer for SystemTimer {
    fn chan(&self) -> &Receiver<SystemTime> {
        &self.rx
    }

    fn reset(&self, duration: Duration) -> bool {
        let mut state = self.shared.state.lock();
        let was_running = state.phase == TimerPhase::Scheduled;
        state.deadline = Instant::now().checked_add(duration);
        state.phase = TimerPhase::Scheduled;
        self.shared.changed.notify_all();
        was_running
    }

    fn stop(&self) -> bool {
        let mut state = self.shared.state.lock();
        if state.phase != TimerPhase::Scheduled {
            return false;
        }
        state.phase = TimerPhase::Stopped;
        self.shared.changed.notify_all();
        true
    }
}

impl Drop for SystemTimer {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        state.detached = true;
        // Nobody can read a dropped channel timer; a callback still runs.
        if !self.callback && state.phase == TimerPhase::Scheduled {
            state.phase = TimerPhase::Stopped;
        }
        self.shared.changed.notify_all();
    }
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
