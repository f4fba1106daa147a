//! Common imports for spec files.

pub use std::time::Duration;

pub use vtime_core::test_support::{
    assert_quiet, at, at_millis, consistently, eventually, expect_recv, millis, secs, wait_budget,
};
pub use vtime_core::{Clock, FakeClock, FakeTimer, Ticker, Timer, TimerPhase};

/// A fake clock pinned to the Unix epoch.
pub fn epoch_clock() -> FakeClock {
    FakeClock::at(at(0))
}
