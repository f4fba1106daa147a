//! Deadline scope specs
//!
//! A scope's deadline is reached by advancing the clock, never by waiting.

use tokio_util::sync::CancellationToken;
use vtime_context::{with_deadline, with_timeout, ScopeError};

use crate::prelude::*;

#[tokio::test]
async fn deadline_reached_by_advancing_virtual_time() {
    let clock = epoch_clock();
    let root = CancellationToken::new();
    let scope = with_timeout(&root, &clock, secs(30)).unwrap();

    clock.advance(secs(29));
    assert_eq!(scope.err(), None);

    clock.advance(secs(1));
    tokio::time::timeout(wait_budget(), scope.token().cancelled()).await.unwrap();
    assert_eq!(scope.err(), Some(ScopeError::DeadlineExceeded));
    assert!(!root.is_cancelled());
}

#[tokio::test]
async fn root_cancel_wins_over_later_deadline() {
    let clock = epoch_clock();
    let root = CancellationToken::new();
    let scope = with_deadline(&root, &clock, at(10)).unwrap();

    root.cancel();
    clock.advance(secs(10));
    assert_eq!(scope.err(), Some(ScopeError::Cancelled));
}

#[tokio::test]
async fn ended_scope_leaves_nothing_scheduled() {
    let clock = epoch_clock();
    let root = CancellationToken::new();
    let scope = with_timeout(&root, &clock, secs(30)).unwrap();
    assert_eq!(clock.pending_triggers(), 0);

    scope.cancel();
    drop(scope);
    clock.advance(secs(60));
    assert!(!root.is_cancelled());
    assert_eq!(clock.pending_triggers(), 0);
}
