//! Ticker specs
//!
//! Tickers tick on interval boundaries measured from their creation time,
//! hold one tick at a time for the reader, and drop what a slow reader missed.

use crate::prelude::*;

/// Advance by each step (seconds) and check the tick the reader sees.
fn replay(clock: &FakeClock, ticker: &impl Ticker, script: &[(u64, Option<u64>)]) {
    for &(step, tick) in script {
        clock.advance(secs(step));
        match tick {
            Some(t) => expect_recv(ticker.chan(), at(t)),
            None => assert_quiet(ticker.chan()),
        }
    }
}

#[test]
fn two_second_ticker_in_one_second_steps() {
    let clock = epoch_clock();
    let ticker = clock.new_ticker(secs(2)).unwrap();
    replay(&clock, &ticker, &[(1, None), (1, Some(2)), (1, None), (1, Some(4)), (2, Some(6))]);
}

#[test]
fn lockstep_advances_never_drop() {
    let clock = epoch_clock();
    let ticker = clock.new_ticker(secs(3)).unwrap();
    for n in 1..=10 {
        clock.advance(secs(3));
        expect_recv(ticker.chan(), at(3 * n));
    }
}

#[test]
fn large_jump_skips_missed_ticks() {
    let clock = epoch_clock();
    let ticker = clock.new_ticker(secs(2)).unwrap();

    clock.advance(secs(6));
    expect_recv(ticker.chan(), at(2));
    assert_quiet(ticker.chan());

    // Realigned to the boundary after the jump, not 4 then 6.
    clock.advance(secs(2));
    expect_recv(ticker.chan(), at(8));
}

#[test]
fn slow_reader_three_second_ticker() {
    let clock = epoch_clock();
    let ticker = clock.new_ticker(secs(3)).unwrap();
    replay(
        &clock,
        &ticker,
        &[
            (3, Some(3)),
            (3, Some(6)),
            (1, None),
            (2, Some(9)),
            (7, Some(12)),
            (7, Some(18)),
            (7, Some(24)),
            (1, None),
            (2, Some(33)),
            (1, None),
            (1, None),
            (1, Some(36)),
            (6, Some(39)),
        ],
    );
}

#[test]
fn stopped_ticker_stays_silent() {
    let clock = epoch_clock();
    let ticker = clock.new_ticker(secs(1)).unwrap();
    clock.advance(secs(1));
    expect_recv(ticker.chan(), at(1));

    ticker.stop();
    ticker.stop();
    replay(&clock, &ticker, &[(1, None), (5, None)]);
}

#[test]
fn zero_interval_is_a_construction_error() {
    let clock = epoch_clock();
    let err = clock.new_ticker(Duration::ZERO).err().unwrap();
    assert_eq!(err.to_string(), "ticker duration cannot be zero");
}
