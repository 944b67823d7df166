//! Smart-money-concepts strategy: liquidity grabs confirmed by order blocks.
//!
//! - Order block: the last opposite-colored candle before a displacement
//!   candle (body >= `displacement_factor` × average body of the preceding
//!   `body_lookback` bars).
//! - Liquidity grab: a bar wicks through the latest confirmed swing low
//!   (high) and closes back above (below) it. Each swing can be grabbed once.
//!
//! Signal: an entry in the rejection direction when a grab completes on the
//! current bar. Strength is 1.0 when the grab bar also trades inside an order
//! block of the same side, 0.5 otherwise.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, BarView, Side, Signal};
use crate::indicators::{body, swing_points, SwingKind, SwingPoint};

use super::{Strategy, StrategyError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmcParams {
    pub swing_strength: usize,
    pub displacement_factor: f64,
    pub body_lookback: usize,
    /// Bars of history the detectors look at on each call.
    pub window: usize,
}

impl Default for SmcParams {
    fn default() -> Self {
        Self {
            swing_strength: 3,
            displacement_factor: 2.0,
            body_lookback: 20,
            window: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBlock {
    /// Index of the block candle.
    pub index: usize,
    pub side: Side,
    pub top: f64,
    pub bottom: f64,
    pub displacement_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityGrab {
    pub index: usize,
    /// Direction of the expected move after the grab.
    pub side: Side,
    pub swept_level: f64,
    pub swing_index: usize,
}

#[derive(Debug, Clone)]
pub struct SmcStrategy {
    params: SmcParams,
}

impl SmcStrategy {
    pub fn new(params: SmcParams) -> Self {
        Self { params }
    }

    pub fn detect_order_blocks(&self, bars: &[Bar]) -> Vec<OrderBlock> {
        let lookback = self.params.body_lookback.max(1);
        let mut blocks = Vec::new();

        for i in lookback..bars.len() {
            let avg_body = bars[i - lookback..i].iter().map(body).sum::<f64>() / lookback as f64;
            let candle = &bars[i];
            if avg_body <= 0.0 || body(candle) < self.params.displacement_factor * avg_body {
                continue;
            }
            let side = if candle.is_bullish() {
                Side::Long
            } else if candle.is_bearish() {
                Side::Short
            } else {
                continue;
            };

            let origin = (i - lookback..i).rev().find(|&j| match side {
                Side::Long => bars[j].is_bearish(),
                Side::Short => bars[j].is_bullish(),
            });
            if let Some(j) = origin {
                blocks.push(OrderBlock {
                    index: j,
                    side,
                    top: bars[j].high,
                    bottom: bars[j].low,
                    displacement_index: i,
                });
            }
        }

        blocks
    }

    pub fn detect_liquidity_grabs(&self, bars: &[Bar]) -> Vec<LiquidityGrab> {
        let k = self.params.swing_strength.max(1);
        let swings = swing_points(bars, k);
        let mut grabs = Vec::new();

        let mut next = 0;
        let mut pending_high: Option<SwingPoint> = None;
        let mut pending_low: Option<SwingPoint> = None;

        for (i, bar) in bars.iter().enumerate() {
            // Only swings confirmed by an earlier bar are visible at i.
            while next < swings.len() && swings[next].index + k < i {
                match swings[next].kind {
                    SwingKind::High => pending_high = Some(swings[next]),
                    SwingKind::Low => pending_low = Some(swings[next]),
                }
                next += 1;
            }

            if let Some(low) = pending_low {
                if bar.low < low.price {
                    if bar.close > low.price {
                        grabs.push(LiquidityGrab {
                            index: i,
                            side: Side::Long,
                            swept_level: low.price,
                            swing_index: low.index,
                        });
                    }
                    // Swept or broken, the liquidity is gone either way.
                    pending_low = None;
                }
            }

            if let Some(high) = pending_high {
                if bar.high > high.price {
                    if bar.close < high.price {
                        grabs.push(LiquidityGrab {
                            index: i,
                            side: Side::Short,
                            swept_level: high.price,
                            swing_index: high.index,
                        });
                    }
                    pending_high = None;
                }
            }
        }

        grabs
    }
}

impl Default for SmcStrategy {
    fn default() -> Self {
        Self::new(SmcParams::default())
    }
}

impl Strategy for SmcStrategy {
    fn name(&self) -> &str {
        "smc"
    }

    fn on_bar(&mut self, bars: &BarView<'_>) -> Result<Vec<Signal>, StrategyError> {
        let window = bars.tail(self.params.window);
        let Some(current) = window.last() else {
            return Ok(Vec::new());
        };
        let last = window.len() - 1;

        let grabs: Vec<LiquidityGrab> = self
            .detect_liquidity_grabs(window)
            .into_iter()
            .filter(|g| g.index == last)
            .collect();
        if grabs.is_empty() {
            return Ok(Vec::new());
        }

        let blocks = self.detect_order_blocks(window);
        let signals = grabs
            .iter()
            .map(|grab| {
                let in_block = blocks.iter().any(|ob| {
                    ob.side == grab.side
                        && ob.displacement_index < last
                        && current.low <= ob.top
                        && current.high >= ob.bottom
                });
                let strength = if in_block { 1.0 } else { 0.5 };
                Signal::entry(grab.side, current.close, "liquidity_grab").with_strength(strength)
            })
            .collect();

        Ok(signals)
    }
}
