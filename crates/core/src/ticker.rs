// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic tickers driven by virtual time.
//!
//! A [`FakeTicker`] owns a worker thread. The clock pushes every new virtual
//! time into the ticker's snapshot queue; the worker drains the queue in
//! arrival order, emits at most one due tick per snapshot on a rendezvous
//! channel, and realigns its schedule the way a real ticker drops ticks for
//! a slow reader.

use crate::error::{ClockError, PrimitiveKind};
use crate::registry::Subscriber;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// A repeating source of time values.
pub trait Ticker: Send {
    /// The channel ticks are delivered on.
    fn chan(&self) -> &Receiver<SystemTime>;

    /// Stop ticking. Permanent and idempotent.
    fn stop(&self);
}

/// Tick bookkeeping for one ticker.
///
/// Lives inside the worker thread, so the next deadline is only ever moved by
/// the worker itself. A next tick past the largest representable time is
/// `None` and the schedule goes quiet.
#[derive(Debug, Clone)]
pub(crate) struct TickSchedule {
    interval: Duration,
    start: SystemTime,
    next: Option<SystemTime>,
}

impl TickSchedule {
    pub(crate) fn new(start: SystemTime, interval: Duration) -> Self {
        Self { interval, start, next: start.checked_add(interval) }
    }

    pub(crate) fn next(&self) -> Option<SystemTime> {
        self.next
    }

    /// The tick to emit for a snapshot at `now`, if one is due.
    pub(crate) fn due(&self, now: SystemTime) -> Option<SystemTime> {
        self.next.filter(|next| *next <= now)
    }

    /// Move past the tick just emitted for the snapshot at `now`.
    ///
    /// Exactly on an interval boundary the next tick is one interval out.
    /// If the reader fell more than a whole interval behind, the missed
    /// ticks are dropped and the schedule snaps to the next boundary.
    /// Otherwise it steps a single interval.
    pub(crate) fn advance_past(&mut self, now: SystemTime) {
        let Some(next) = self.next else {
            return;
        };
        let elapsed = now.duration_since(self.start).unwrap_or_default();
        let offset = duration_rem(elapsed, self.interval);
        let lag = now.duration_since(next).unwrap_or_default();

        self.next = if offset.is_zero() {
            now.checked_add(self.interval)
        } else if lag > self.interval {
            now.checked_add(self.interval - offset)
        } else {
            next.checked_add(self.interval)
        };
    }
}

fn duration_rem(a: Duration, b: Duration) -> Duration {
    let rem = a.as_nanos() % b.as_nanos();
    Duration::new((rem / 1_000_000_000) as u64, (rem % 1_000_000_000) as u32)
}

/// Messages from the clock (and the handle) to a ticker worker.
pub(crate) enum TickerEvent {
    Advanced(SystemTime),
    Stop,
}

/// The clock's side of a ticker: its snapshot queue.
pub(crate) struct TickerSubscription {
    snapshots: Sender<TickerEvent>,
    stopped: Arc<AtomicBool>,
}

impl Subscriber for TickerSubscription {
    fn notify(&mut self, now: SystemTime) -> bool {
        if self.stopped.load(Ordering::Acquire) {
            return false;
        }
        // Fails only once the worker has exited.
        self.snapshots.send(TickerEvent::Advanced(now)).is_ok()
    }
}

/// A ticker tied to a [`FakeClock`](crate::FakeClock)'s virtual time.
pub struct FakeTicker {
    interval: Duration,
    ticks: Receiver<SystemTime>,
    control: Sender<TickerEvent>,
    stopped: Arc<AtomicBool>,
}

impl FakeTicker {
    /// Start the worker for a ticker created at `start`.
    ///
    /// Returns the handle plus the subscription the clock registers.
    pub(crate) fn spawn(
        start: SystemTime,
        interval: Duration,
    ) -> Result<(Self, TickerSubscription), ClockError> {
        let (events_tx, events_rx) = mpsc::channel();
        let (ticks_tx, ticks_rx) = mpsc::sync_channel(0);
        let stopped = Arc::new(AtomicBool::new(false));

        let schedule = TickSchedule::new(start, interval);
        let worker_stopped = Arc::clone(&stopped);
        std::thread::Builder::new()
            .name("vtime-ticker".to_string())
            .spawn(move || run_worker(schedule, events_rx, ticks_tx, worker_stopped))
            .map_err(|source| ClockError::Spawn { kind: PrimitiveKind::Ticker, source })?;

        let subscription =
            TickerSubscription { snapshots: events_tx.clone(), stopped: Arc::clone(&stopped) };
        let ticker = Self { interval, ticks: ticks_rx, control: events_tx, stopped };
        Ok((ticker, subscription))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl Ticker for FakeTicker {
    fn chan(&self) -> &Receiver<SystemTime> {
        &self.ticks
    }

    fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!(interval = ?self.interval, "ticker stopped");
        // Wakes an idle worker so it can exit.
        let _ = self.control.send(TickerEvent::Stop);
    }
}

impl Drop for FakeTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(
    mut schedule: TickSchedule,
    events: Receiver<TickerEvent>,
    ticks: SyncSender<SystemTime>,
    stopped: Arc<AtomicBool>,
) {
    for event in events.iter() {
        let now = match event {
            TickerEvent::Advanced(now) => now,
            TickerEvent::Stop => break,
        };
        // At most one tick per snapshot; `advance_past` always lands beyond `now`.
        let Some(tick) = schedule.due(now) else {
            continue;
        };
        if stopped.load(Ordering::Acquire) {
            tracing::trace!("ticker worker exiting after stop");
            return;
        }
        // Blocks until a reader takes the tick.
        if ticks.send(tick).is_err() {
            tracing::trace!("ticker reader gone");
            return;
        }
        schedule.advance_past(now);
        tracing::trace!(tick = ?tick, next = ?schedule.next(), "tick delivered");
    }
    // Dropping `events` here discards any snapshots still queued.
    tracing::trace!("ticker worker exiting");
}

#[cfg(test)]
#[path = "ticker_tests.rs"]
mod tests;
