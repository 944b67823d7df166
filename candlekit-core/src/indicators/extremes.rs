//! Highest high / lowest low across a window.

use crate::domain::Bar;

use super::IndicatorError;

/// Maximum `high` across all bars.
pub fn highest(bars: &[Bar]) -> Result<f64, IndicatorError> {
    bars.iter()
        .map(|b| b.high)
        .reduce(f64::max)
        .ok_or(IndicatorError::EmptySeries)
}

/// Minimum `low` across all bars.
pub fn lowest(bars: &[Bar]) -> Result<f64, IndicatorError> {
    bars.iter()
        .map(|b| b.low)
        .reduce(f64::min)
        .ok_or(IndicatorError::EmptySeries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn highest_and_lowest() {
        let bars = make_ohlc_bars(&[
            (10.0, 12.0, 9.0, 11.0),
            (11.0, 15.0, 10.0, 14.0),
            (14.0, 14.0, 8.5, 13.5),
        ]);
        assert_approx(highest(&bars).unwrap(), 15.0, DEFAULT_EPSILON);
        assert_approx(lowest(&bars).unwrap(), 8.5, DEFAULT_EPSILON);
    }

    #[test]
    fn single_bar_returns_own_extremes() {
        let bars = make_ohlc_bars(&[(100.0, 110.0, 95.0, 105.0)]);
        assert_eq!(highest(&bars).unwrap(), 110.0);
        assert_eq!(lowest(&bars).unwrap(), 95.0);
    }

    #[test]
    fn empty_is_error() {
        assert_eq!(highest(&[]), Err(IndicatorError::EmptySeries));
        assert_eq!(lowest(&[]), Err(IndicatorError::EmptySeries));
    }
}
