//! Swing (fractal) highs and lows.
//!
//! A swing high at `i` is a bar whose high is strictly above the `strength`
//! bars to its left and not exceeded by the `strength` bars to its right. The
//! right-hand bars must exist, so a swing is only reported once it is
//! confirmed: the most recent `strength` bars of any window never qualify.
//! This keeps the function free of look-ahead when it runs on a prefix.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
    pub kind: SwingKind,
}

/// All confirmed swing points in `bars`, ordered by index (high before low
/// when an outside bar is both).
///
/// `strength` is clamped to at least 1.
pub fn swing_points(bars: &[Bar], strength: usize) -> Vec<SwingPoint> {
    let k = strength.max(1);
    let n = bars.len();
    let mut points = Vec::new();
    if n < 2 * k + 1 {
        return points;
    }

    for i in k..n - k {
        let left = &bars[i - k..i];
        let right = &bars[i + 1..=i + k];
        let bar = &bars[i];

        if left.iter().all(|b| b.high < bar.high) && right.iter().all(|b| b.high <= bar.high) {
            points.push(SwingPoint {
                index: i,
                price: bar.high,
                kind: SwingKind::High,
            });
        }
        if left.iter().all(|b| b.low > bar.low) && right.iter().all(|b| b.low >= bar.low) {
            points.push(SwingPoint {
                index: i,
                price: bar.low,
                kind: SwingKind::Low,
            });
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    fn peak_and_trough() -> Vec<Bar> {
        make_ohlc_bars(&[
            (10.0, 11.0, 9.0, 10.5),
            (10.5, 12.0, 10.0, 11.5),
            (11.5, 15.0, 11.0, 14.0), // swing high at 2
            (14.0, 14.5, 12.0, 12.5),
            (12.5, 13.0, 8.0, 9.0), // swing low at 4
            (9.0, 11.0, 8.5, 10.5),
            (10.5, 12.5, 10.0, 12.0),
        ])
    }

    #[test]
    fn detects_high_and_low() {
        let points = swing_points(&peak_and_trough(), 2);
        assert_eq!(
            points,
            vec![
                SwingPoint { index: 2, price: 15.0, kind: SwingKind::High },
                SwingPoint { index: 4, price: 8.0, kind: SwingKind::Low },
            ]
        );
    }

    #[test]
    fn unconfirmed_tail_is_ignored() {
        let bars = peak_and_trough();
        // Without bars 5 and 6 the low at 4 has no right-hand confirmation.
        let points = swing_points(&bars[..5], 2);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].kind, SwingKind::High);
    }

    #[test]
    fn too_few_bars() {
        let bars = peak_and_trough();
        assert!(swing_points(&bars[..4], 2).is_empty());
        assert!(swing_points(&[], 1).is_empty());
    }

    #[test]
    fn prefix_results_are_stable() {
        let bars = peak_and_trough();
        let full = swing_points(&bars, 1);
        for end in 1..=bars.len() {
            let partial = swing_points(&bars[..end], 1);
            assert_eq!(partial[..], full[..partial.len()]);
        }
    }
}
