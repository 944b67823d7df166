//! Single-candle anatomy: body, wicks, range, true range.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// Upper and lower shadow lengths of a candle. Both are >= 0 for a sane bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wick {
    pub upper: f64,
    pub lower: f64,
}

/// `|close - open|`
pub fn body(bar: &Bar) -> f64 {
    (bar.close - bar.open).abs()
}

pub fn wick(bar: &Bar) -> Wick {
    Wick {
        upper: bar.high - bar.body_top(),
        lower: bar.body_bottom() - bar.low,
    }
}

/// `high - low`
pub fn range(bar: &Bar) -> f64 {
    bar.high - bar.low
}

/// Wilder's true range: the bar range widened to include the previous close.
pub fn true_range(bar: &Bar, prev_close: Option<f64>) -> f64 {
    let high_low = range(bar);
    match prev_close {
        Some(pc) => high_low
            .max((bar.high - pc).abs())
            .max((bar.low - pc).abs()),
        None => high_low,
    }
}
