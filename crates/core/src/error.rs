// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised while constructing tickers and timers.

use thiserror::Error;

/// Which primitive rejected its construction arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Ticker,
    Timer,
}

crate::simple_display! {
    PrimitiveKind {
        Ticker => "ticker",
        Timer => "timer",
    }
}

#[derive(Debug, Error)]
pub enum ClockError {
    /// A ticker or timer was asked to fire every/after zero time.
    ///
    /// This is a caller bug and is never coerced to a minimum interval.
    #[error("{kind} duration cannot be zero")]
    ZeroDuration { kind: PrimitiveKind },
    #[error("failed to spawn {kind} worker: {source}")]
    Spawn {
        kind: PrimitiveKind,
        #[source]
        source: std::io::Error,
    },
}

impl ClockError {
    pub fn is_zero_duration(&self) -> bool {
        matches!(self, ClockError::ZeroDuration { .. })
    }
}

/// Reject zero durations for `kind` at construction time.
pub(crate) fn require_nonzero(
    duration: std::time::Duration,
    kind: PrimitiveKind,
) -> Result<(), ClockError> {
    if duration.is_zero() {
        return Err(ClockError::ZeroDuration { kind });
    }
    Ok(())
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
