// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use std::fmt::Debug;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

// ── Time helpers ────────────────────────────────────────────────────────────

/// `secs` seconds after the Unix epoch.
pub fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

/// `ms` milliseconds after the Unix epoch.
pub fn at_millis(ms: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(ms)
}

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

pub fn millis(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ── Wait budgets ────────────────────────────────────────────────────────────

/// How long to wait for something that should happen (`VTIME_TEST_WAIT_MS`, default 1s).
pub fn wait_budget() -> Duration {
    env_ms("VTIME_TEST_WAIT_MS").unwrap_or(Duration::from_secs(1))
}

/// How long to watch for something that should not happen (`VTIME_TEST_QUIET_MS`, default 50ms).
pub fn quiet_window() -> Duration {
    env_ms("VTIME_TEST_QUIET_MS").unwrap_or(Duration::from_millis(50))
}

fn env_ms(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

// ── Channel assertions ──────────────────────────────────────────────────────

/// Receive within the wait budget and compare against `expected`.
#[track_caller]
pub fn expect_recv<T: Debug + PartialEq>(rx: &Receiver<T>, expected: T) {
    match rx.recv_timeout(wait_budget()) {
        Ok(value) => assert_eq!(value, expected),
        Err(RecvTimeoutError::Timeout) => panic!("timed out waiting for {expected:?}"),
        Err(RecvTimeoutError::Disconnected) => {
            panic!("channel disconnected while waiting for {expected:?}")
        }
    }
}

/// Assert nothing arrives on `rx` for the quiet window.
#[track_caller]
pub fn assert_quiet<T: Debug>(rx: &Receiver<T>) {
    match rx.recv_timeout(quiet_window()) {
        Ok(value) => panic!("expected no value, received {value:?}"),
        Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {}
    }
}

// ── Polling ─────────────────────────────────────────────────────────────────

/// Poll `cond` until it holds or the wait budget runs out.
pub fn eventually(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + wait_budget();
    loop {
        if cond() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Poll `cond` for the quiet window; true if it held every time.
pub fn consistently(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + quiet_window();
    while Instant::now() < deadline {
        if !cond() {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

// ── Proptest strategies ─────────────────────────────────────────────────────

/// Proptest strategies for clock inputs.
pub mod strategies {
    use proptest::prelude::*;
    use std::time::Duration;

    /// A short run of advance steps, each between zero and one hour.
    pub fn arb_advances() -> impl Strategy<Value = Vec<Duration>> {
        prop::collection::vec((0u64..3_600_000).prop_map(Duration::from_millis), 0..32)
    }

    /// Offsets (in seconds) for a batch of `after` calls.
    pub fn arb_offsets() -> impl Strategy<Value = Vec<u64>> {
        prop::collection::vec(0u64..1_000, 1..16)
    }
}
