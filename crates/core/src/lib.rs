// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vtime-core: deterministic, programmatically advanced time.
//!
//! Code that needs delays, periodic ticks or timeouts takes a [`Clock`].
//! Production passes [`SystemClock`]; tests pass a [`FakeClock`] and move
//! virtual time with [`FakeClock::advance`], observing exactly which
//! triggers, ticks and timers fire.

pub mod macros;

pub mod clock;
pub mod error;
pub mod fake;
mod registry;
pub mod system;
pub mod ticker;
pub mod timer;
mod trigger;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, SystemClock};
pub use error::{ClockError, PrimitiveKind};
pub use fake::FakeClock;
pub use system::{SystemTicker, SystemTimer};
pub use ticker::{FakeTicker, Ticker};
pub use timer::{FakeTimer, Timer, TimerAdvancer, TimerPhase};
