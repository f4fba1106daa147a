// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscriber registry owned by a `FakeClock`.
//!
//! Tickers and timers register here when they are created. On every advance
//! the clock hands each subscriber the new virtual time; subscribers only
//! enqueue work or flip their own state and must never block, since the
//! clock's lock is held for the whole pass.

use std::time::SystemTime;

/// Something that wants to hear about every advance of virtual time.
pub(crate) trait Subscriber: Send {
    /// Observe the clock's new time.
    ///
    /// Returns `false` once the subscriber is finished for good and can be
    /// dropped from the registry.
    fn notify(&mut self, now: SystemTime) -> bool;
}

#[derive(Default)]
pub(crate) struct Registry {
    subscribers: Vec<Box<dyn Subscriber>>,
}

impl Registry {
    pub(crate) fn register(&mut self, subscriber: Box<dyn Subscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Notify every live subscriber of `now`, pruning finished ones.
    pub(crate) fn notify_all(&mut self, now: SystemTime) {
        let before = self.subscribers.len();
        self.subscribers.retain_mut(|s| s.notify(now));
        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            tracing::trace!(pruned, live = self.subscribers.len(), "pruned subscribers");
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
