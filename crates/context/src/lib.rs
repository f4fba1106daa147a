// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vtime-context: cancellation scopes with deadlines measured on a [`Clock`].
//!
//! A [`DeadlineScope`] wraps a child [`CancellationToken`] that is cancelled
//! when its parent is, when the scope is cancelled or dropped, or when the
//! clock reaches the scope's deadline. Under a `FakeClock` the deadline is
//! reached only by advancing virtual time.
//!
//! [`Clock`]: vtime_core::Clock
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

mod deadline;

pub use deadline::{with_deadline, with_timeout, DeadlineScope, ScopeError};
