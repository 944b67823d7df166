//! Trailing averages over the end of a window.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

use super::candle::true_range;

/// Which bar field an average reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Open,
    High,
    Low,
    #[default]
    Close,
}

impl PriceField {
    pub fn of(self, bar: &Bar) -> f64 {
        match self {
            PriceField::Open => bar.open,
            PriceField::High => bar.high,
            PriceField::Low => bar.low,
            PriceField::Close => bar.close,
        }
    }
}

/// Arithmetic mean of the last `period` values of `field`.
///
/// `None` while fewer than `period` bars exist (and for `period == 0`).
pub fn moving_average(bars: &[Bar], period: usize, field: PriceField) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let sum: f64 = bars[bars.len() - period..]
        .iter()
        .map(|b| field.of(b))
        .sum();
    Some(sum / period as f64)
}

/// Simple average of the true range over the last `period` bars.
///
/// The first bar in the window uses the close before it when one exists.
pub fn average_true_range(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let start = bars.len() - period;
    let sum: f64 = (start..bars.len())
        .map(|i| {
            let prev_close = i.checked_sub(1).map(|p| bars[p].close);
            true_range(&bars[i], prev_close)
        })
        .sum();
    Some(sum / period as f64)
}
