//! Technical indicator library.
//!
//! Every function here is pure: it reads a slice of bars (a `BarSeries` or a
//! `BarView` deref to one) and returns a value. Nothing is cached and nothing
//! is mutated, so the same series can be shared across threads freely.
//!
//! Two kinds of "no value" exist and are kept apart:
//! - `Err(IndicatorError::EmptySeries)`: the caller asked for an extreme over
//!   zero bars, which is a caller bug.
//! - `None`: not enough history yet (e.g. a 14-period average over 10 bars).
//!   This is the normal state at the start of every run.

pub mod average;
pub mod candle;
pub mod extremes;
pub mod swing;

pub use average::{average_true_range, moving_average, PriceField};
pub use candle::{body, range, true_range, wick, Wick};
pub use extremes::{highest, lowest};
pub use swing::{swing_points, SwingKind, SwingPoint};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("indicator called on an empty series")]
    EmptySeries,
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLC: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, one bar per day.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    let rows: Vec<(f64, f64, f64, f64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            (open, open.max(close) + 1.0, open.min(close) - 1.0, close)
        })
        .collect();
    make_ohlc_bars(&rows)
}

/// Create bars from explicit `(open, high, low, close)` rows, one per day.
#[cfg(test)]
pub fn make_ohlc_bars(rows: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    rows.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            crate::domain::Bar::new(
                base + chrono::Duration::days(i as i64),
                open,
                high,
                low,
                close,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
