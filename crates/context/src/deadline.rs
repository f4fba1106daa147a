// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadline-bound cancellation scopes.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use vtime_core::{Clock, ClockError, Timer};

/// Why a scope ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The scope, or one of its ancestors, was cancelled first.
    #[error("scope cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// First cause wins; recorded under the same lock that cancels the token.
struct Outcome {
    token: CancellationToken,
    err: Mutex<Option<ScopeError>>,
}

impl Outcome {
    fn child_of(parent: &CancellationToken) -> Arc<Self> {
        Arc::new(Self { token: parent.child_token(), err: Mutex::new(None) })
    }

    fn err(&self) -> Option<ScopeError> {
        let mut err = self.err.lock();
        if err.is_none() && self.token.is_cancelled() {
            *err = Some(ScopeError::Cancelled);
        }
        *err
    }

    fn finish(&self, cause: ScopeError) {
        let mut err = self.err.lock();
        if err.is_some() {
            return;
        }
        // A parent cancellation that already landed takes precedence.
        let cause = if self.token.is_cancelled() { ScopeError::Cancelled } else { cause };
        *err = Some(cause);
        self.token.cancel();
        tracing::debug!(%cause, "deadline scope finished");
    }
}

/// A child cancellation scope bounded by a deadline.
///
/// The deadline is a callback timer on the clock. Cancelling or dropping the
/// scope stops it, so an ended scope leaves nothing scheduled behind.
pub struct DeadlineScope {
    outcome: Arc<Outcome>,
    deadline: Option<SystemTime>,
    timer: Mutex<Option<Box<dyn Timer>>>,
}

impl DeadlineScope {
    /// The scope's token. Derive further children from it.
    pub fn token(&self) -> &CancellationToken {
        &self.outcome.token
    }

    /// `None` if the deadline lies beyond the largest representable time.
    pub fn deadline(&self) -> Option<SystemTime> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.outcome.finish(ScopeError::Cancelled);
        self.disarm();
    }

    /// `None` while the scope is live.
    pub fn err(&self) -> Option<ScopeError> {
        self.outcome.err()
    }

    fn disarm(&self) {
        if let Some(timer) = self.timer.lock().take() {
            timer.stop();
        }
    }
}

impl Drop for DeadlineScope {
    fn drop(&mut self) {
        self.outcome.finish(ScopeError::Cancelled);
        self.disarm();
    }
}

/// A scope that ends `timeout` after `clock.now()`.
pub fn with_timeout<C>(
    parent: &CancellationToken,
    clock: &C,
    timeout: Duration,
) -> Result<DeadlineScope, ClockError>
where
    C: Clock,
    C::Timer: 'static,
{
    match clock.now().checked_add(timeout) {
        Some(deadline) => with_deadline(parent, clock, deadline),
        None => {
            tracing::debug!(?timeout, "deadline unrepresentable, scope ends only by cancellation");
            Ok(DeadlineScope {
                outcome: Outcome::child_of(parent),
                deadline: None,
                timer: Mutex::new(None),
            })
        }
    }
}

/// A scope that ends once `clock` reaches `deadline`.
///
/// A deadline at or before `clock.now()` ends the scope immediately.
pub fn with_deadline<C>(
    parent: &CancellationToken,
    clock: &C,
    deadline: SystemTime,
) -> Result<DeadlineScope, ClockError>
where
    C: Clock,
    C::Timer: 'static,
{
    let outcome = Outcome::child_of(parent);
    if deadline <= clock.now() {
        outcome.finish(ScopeError::DeadlineExceeded);
        return Ok(DeadlineScope { outcome, deadline: Some(deadline), timer: Mutex::new(None) });
    }

    let on_deadline = Arc::clone(&outcome);
    let timer = clock.after_func_at(deadline, move || {
        on_deadline.finish(ScopeError::DeadlineExceeded);
    })?;
    tracing::debug!(?deadline, "deadline scope started");
    Ok(DeadlineScope {
        outcome,
        deadline: Some(deadline),
        timer: Mutex::new(Some(Box::new(timer))),
    })
}

#[cfg(test)]
#[path = "deadline_tests.rs"]
mod tests;
