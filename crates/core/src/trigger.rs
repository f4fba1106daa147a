// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot delayed triggers backing `FakeClock::after`.
//!
//! A trigger is created with a fixed deadline and a capacity-1 channel. The
//! clock is its only producer: it removes the trigger from the queue and sends
//! the deadline in the same locked pass, so a trigger can never fire twice.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::time::SystemTime;

/// A registered `after` call waiting for virtual time to reach its deadline.
pub(crate) struct PendingTrigger {
    deadline: SystemTime,
    tx: SyncSender<SystemTime>,
}

impl PendingTrigger {
    /// Create a trigger and the receiving half handed back to the caller.
    pub(crate) fn new(deadline: SystemTime) -> (Self, Receiver<SystemTime>) {
        let (tx, rx) = mpsc::sync_channel(1);
        (Self { deadline, tx }, rx)
    }

    pub(crate) fn deadline(&self) -> SystemTime {
        self.deadline
    }

    /// Deliver the deadline. Consumes the trigger.
    ///
    /// The buffer holds exactly one value and this is the only send, so it
    /// never blocks.
    fn fire(self) {
        match self.tx.try_send(self.deadline) {
            Ok(()) => tracing::trace!(deadline = ?self.deadline, "trigger fired"),
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!(deadline = ?self.deadline, "trigger fired with no receiver")
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(deadline = ?self.deadline, "trigger channel unexpectedly full")
            }
        }
    }
}

/// Pending triggers, kept sorted ascending by deadline.
///
/// Equal deadlines keep their insertion order. Triggers whose deadline
/// cannot be represented are held open in `unreachable` and never fire.
#[derive(Default)]
pub(crate) struct TriggerQueue {
    pending: Vec<PendingTrigger>,
    unreachable: Vec<SyncSender<SystemTime>>,
}

impl TriggerQueue {
    pub(crate) fn insert(&mut self, trigger: PendingTrigger) {
        let idx = self.pending.partition_point(|p| p.deadline <= trigger.deadline);
        self.pending.insert(idx, trigger);
    }

    /// A trigger that no advance can reach. Its receiver blocks for as long
    /// as the queue lives.
    pub(crate) fn hold_unreachable(&mut self) -> Receiver<SystemTime> {
        let (tx, rx) = mpsc::sync_channel(1);
        self.unreachable.push(tx);
        rx
    }

    /// Remove and fire every trigger whose deadline is at or before `now`,
    /// in deadline order. Returns how many fired.
    pub(crate) fn fire_due(&mut self, now: SystemTime) -> usize {
        let due = self.pending.partition_point(|p| p.deadline <= now);
        for trigger in self.pending.drain(..due) {
            trigger.fire();
        }
        due
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len() + self.unreachable.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn deadlines(&self) -> Vec<SystemTime> {
        self.pending.iter().map(PendingTrigger::deadline).collect()
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
