// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::at;
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every time it sees and stays registered for `budget` notifications.
struct Recorder {
    seen: Arc<Mutex<Vec<SystemTime>>>,
    budget: usize,
}

impl Subscriber for Recorder {
    fn notify(&mut self, now: SystemTime) -> bool {
        self.seen.lock().push(now);
        self.budget -= 1;
        self.budget > 0
    }
}

fn recorder(budget: usize) -> (Box<dyn Subscriber>, Arc<Mutex<Vec<SystemTime>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    (Box::new(Recorder { seen: Arc::clone(&seen), budget }), seen)
}

#[test]
fn every_subscriber_sees_each_advance() {
    let mut registry = Registry::default();
    let (a, seen_a) = recorder(10);
    let (b, seen_b) = recorder(10);
    registry.register(a);
    registry.register(b);

    registry.notify_all(at(1));
    registry.notify_all(at(2));

    assert_eq!(*seen_a.lock(), vec![at(1), at(2)]);
    assert_eq!(*seen_b.lock(), vec![at(1), at(2)]);
}

#[test]
fn finished_subscribers_are_pruned() {
    let mut registry = Registry::default();
    let (short, seen_short) = recorder(1);
    let (long, _seen_long) = recorder(10);
    registry.register(short);
    registry.register(long);

    registry.notify_all(at(1));
    assert_eq!(registry.len(), 1);

    registry.notify_all(at(2));
    assert_eq!(*seen_short.lock(), vec![at(1)]);
}
