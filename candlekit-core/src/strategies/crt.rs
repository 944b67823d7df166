//! Candle-range strategy: range, body and wick analysis plus price reaction.
//!
//! The trade idea: a candle defines a range. When the next candle runs the
//! stops beyond one end of that range and closes back inside it, price is
//! expected to travel toward the other end.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, BarView, Side, Signal};
use crate::indicators::{body, range, wick};

use super::{Strategy, StrategyError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrtParams {
    /// Bars averaged when deciding whether a candle's range is expanded.
    pub range_lookback: usize,
    pub range_factor: f64,
    /// Minimum body / range for a strong-bodied candle.
    pub body_ratio: f64,
    /// Minimum wick / range for a rejection wick.
    pub wick_ratio: f64,
    pub window: usize,
}

impl Default for CrtParams {
    fn default() -> Self {
        Self {
            range_lookback: 10,
            range_factor: 1.5,
            body_ratio: 0.6,
            wick_ratio: 0.5,
            window: 50,
        }
    }
}

/// A candle whose range is expanded relative to recent history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleRange {
    pub index: usize,
    pub high: f64,
    pub low: f64,
    /// Range divided by the average range of the preceding bars.
    pub expansion: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrongBody {
    pub index: usize,
    pub side: Side,
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WickRejection {
    pub index: usize,
    /// Long for a long lower wick (sellers rejected), Short for an upper one.
    pub side: Side,
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceReaction {
    pub index: usize,
    pub side: Side,
    pub swept_level: f64,
    pub range_high: f64,
    pub range_low: f64,
}

#[derive(Debug, Clone)]
pub struct CrtStrategy {
    params: CrtParams,
}

impl CrtStrategy {
    pub fn new(params: CrtParams) -> Self {
        Self { params }
    }

    pub fn analyze_range(&self, bars: &[Bar]) -> Vec<CandleRange> {
        let lookback = self.params.range_lookback.max(1);
        (lookback..bars.len())
            .filter_map(|i| {
                let avg = bars[i - lookback..i].iter().map(range).sum::<f64>() / lookback as f64;
                if avg <= 0.0 {
                    return None;
                }
                let expansion = range(&bars[i]) / avg;
                (expansion >= self.params.range_factor).then(|| CandleRange {
                    index: i,
                    high: bars[i].high,
                    low: bars[i].low,
                    expansion,
                })
            })
            .collect()
    }

    pub fn analyze_body(&self, bars: &[Bar]) -> Vec<StrongBody> {
        bars.iter()
            .enumerate()
            .filter_map(|(index, bar)| {
                let full = range(bar);
                if full <= 0.0 {
                    return None;
                }
                let ratio = body(bar) / full;
                let side = if bar.is_bullish() {
                    Side::Long
                } else if bar.is_bearish() {
                    Side::Short
                } else {
                    return None;
                };
                (ratio >= self.params.body_ratio).then_some(StrongBody { index, side, ratio })
            })
            .collect()
    }

    pub fn analyze_wick(&self, bars: &[Bar]) -> Vec<WickRejection> {
        let mut rejections = Vec::new();
        for (index, bar) in bars.iter().enumerate() {
            let full = range(bar);
            if full <= 0.0 {
                continue;
            }
            let w = wick(bar);
            let lower = w.lower / full;
            let upper = w.upper / full;
            if lower >= self.params.wick_ratio {
                rejections.push(WickRejection { index, side: Side::Long, ratio: lower });
            }
            if upper >= self.params.wick_ratio {
                rejections.push(WickRejection { index, side: Side::Short, ratio: upper });
            }
        }
        rejections
    }

    /// Bars that sweep exactly one end of the previous candle and close back
    /// inside it. Outside bars sweeping both ends are ambiguous and skipped.
    pub fn price_reaction(&self, bars: &[Bar]) -> Vec<PriceReaction> {
        bars.windows(2)
            .enumerate()
            .filter_map(|(offset, pair)| {
                let (prev, bar) = (&pair[0], &pair[1]);
                let inside = bar.close < prev.high && bar.close > prev.low;
                let swept_high = bar.high > prev.high;
                let swept_low = bar.low < prev.low;
                let (side, swept_level) = match (inside, swept_high, swept_low) {
                    (true, true, false) => (Side::Short, prev.high),
                    (true, false, true) => (Side::Long, prev.low),
                    _ => return None,
                };
                Some(PriceReaction {
                    index: offset + 1,
                    side,
                    swept_level,
                    range_high: prev.high,
                    range_low: prev.low,
                })
            })
            .collect()
    }
}

impl Default for CrtStrategy {
    fn default() -> Self {
        Self::new(CrtParams::default())
    }
}

impl Strategy for CrtStrategy {
    fn name(&self) -> &str {
        "crt"
    }

    fn on_bar(&mut self, bars: &BarView<'_>) -> Result<Vec<Signal>, StrategyError> {
        let window = bars.tail(self.params.window);
        let n = window.len();
        if n < 2 {
            return Ok(Vec::new());
        }
        let current = &window[n - 1];

        let Some(reaction) = self.price_reaction(&window[n - 2..]).into_iter().next() else {
            return Ok(Vec::new());
        };

        let mut strength = 0.5;
        if self.analyze_range(window).iter().any(|r| r.index == n - 2) {
            strength += 0.25;
        }
        if self
            .analyze_wick(&window[n - 1..])
            .iter()
            .any(|w| w.side == reaction.side)
        {
            strength += 0.25;
        }

        Ok(vec![
            Signal::entry(reaction.side, current.close, "range_sweep").with_strength(strength)
        ])
    }
}
