//! ICT strategy: market-structure shift, fair-value gaps, optimal trade entry.
//!
//! A structure shift is a close beyond the latest confirmed swing against the
//! prevailing direction. The first break in a window only establishes that
//! direction. After a shift the strategy waits for price to retrace into the
//! optimal-trade-entry zone (by default 62%–79% of the shifting leg) and
//! enters once per shift. A close beyond the origin of the leg cancels the
//! setup.
//!
//! Signals:
//! - `Exit` for the opposite side on the bar that shifts structure.
//! - `Entry` on the first tap of the OTE zone. Strength 1.0 when a fair-value
//!   gap formed inside the leg, 0.6 otherwise.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, BarView, Side, Signal};
use crate::indicators::{swing_points, SwingKind, SwingPoint};

use super::{window_base, Strategy, StrategyError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IctParams {
    pub swing_strength: usize,
    /// Shallow edge of the OTE zone, as a retracement fraction of the leg.
    pub ote_low: f64,
    /// Deep edge of the OTE zone.
    pub ote_high: f64,
    pub window: usize,
}

impl Default for IctParams {
    fn default() -> Self {
        Self {
            swing_strength: 3,
            ote_low: 0.62,
            ote_high: 0.79,
            window: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureShift {
    pub index: usize,
    /// New direction of the market.
    pub side: Side,
    pub broken_level: f64,
    pub swing_index: usize,
    pub leg_high: f64,
    pub leg_low: f64,
}

/// Three-bar imbalance; `index` is the middle (displacement) bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairValueGap {
    pub index: usize,
    pub side: Side,
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OteZone {
    pub shift_index: usize,
    pub side: Side,
    pub top: f64,
    pub bottom: f64,
}

impl OteZone {
    pub fn touched_by(&self, bar: &Bar) -> bool {
        bar.low <= self.top && bar.high >= self.bottom
    }
}

/// Pending retracement setup, indices relative to the full view.
#[derive(Debug, Clone, Copy)]
struct Setup {
    zone: OteZone,
    swing_index: usize,
    shift_index: usize,
    invalidation: f64,
}

#[derive(Debug, Clone)]
pub struct IctStrategy {
    params: IctParams,
    last_shift: Option<usize>,
    setup: Option<Setup>,
}

impl IctStrategy {
    pub fn new(params: IctParams) -> Self {
        Self {
            params,
            last_shift: None,
            setup: None,
        }
    }

    pub fn detect_market_structure_shift(&self, bars: &[Bar]) -> Vec<StructureShift> {
        let k = self.params.swing_strength.max(1);
        let swings = swing_points(bars, k);
        let mut shifts = Vec::new();

        let mut next = 0;
        let mut pending_high: Option<SwingPoint> = None;
        let mut pending_low: Option<SwingPoint> = None;
        let mut recent_high: Option<SwingPoint> = None;
        let mut recent_low: Option<SwingPoint> = None;
        let mut trend: Option<Side> = None;

        for (i, bar) in bars.iter().enumerate() {
            while next < swings.len() && swings[next].index + k < i {
                let swing = swings[next];
                match swing.kind {
                    SwingKind::High => {
                        pending_high = Some(swing);
                        recent_high = Some(swing);
                    }
                    SwingKind::Low => {
                        pending_low = Some(swing);
                        recent_low = Some(swing);
                    }
                }
                next += 1;
            }

            if let Some(high) = pending_high {
                if bar.close > high.price {
                    if trend == Some(Side::Short) {
                        let leg_low = bars[high.index..=i]
                            .iter()
                            .map(|b| b.low)
                            .fold(recent_low.map_or(f64::INFINITY, |s| s.price), f64::min);
                        shifts.push(StructureShift {
                            index: i,
                            side: Side::Long,
                            broken_level: high.price,
                            swing_index: high.index,
                            leg_high: bar.high,
                            leg_low,
                        });
                    }
                    trend = Some(Side::Long);
                    pending_high = None;
                }
            }

            if let Some(low) = pending_low {
                if bar.close < low.price {
                    if trend == Some(Side::Long) {
                        let leg_high = bars[low.index..=i]
                            .iter()
                            .map(|b| b.high)
                            .fold(recent_high.map_or(f64::NEG_INFINITY, |s| s.price), f64::max);
                        shifts.push(StructureShift {
                            index: i,
                            side: Side::Short,
                            broken_level: low.price,
                            swing_index: low.index,
                            leg_high,
                            leg_low: bar.low,
                        });
                    }
                    trend = Some(Side::Short);
                    pending_low = None;
                }
            }
        }

        shifts
    }

    pub fn detect_fair_value_gap(&self, bars: &[Bar]) -> Vec<FairValueGap> {
        let mut gaps = Vec::new();
        for (offset, trio) in bars.windows(3).enumerate() {
            let (before, after) = (&trio[0], &trio[2]);
            if before.high < after.low {
                gaps.push(FairValueGap {
                    index: offset + 1,
                    side: Side::Long,
                    top: after.low,
                    bottom: before.high,
                });
            } else if before.low > after.high {
                gaps.push(FairValueGap {
                    index: offset + 1,
                    side: Side::Short,
                    top: before.low,
                    bottom: after.high,
                });
            }
        }
        gaps
    }

    /// OTE zones for every structure shift in `bars`.
    pub fn optimal_trade_entry(&self, bars: &[Bar]) -> Vec<OteZone> {
        self.detect_market_structure_shift(bars)
            .iter()
            .map(|shift| self.ote_zone(shift))
            .collect()
    }

    fn ote_zone(&self, shift: &StructureShift) -> OteZone {
        let leg = shift.leg_high - shift.leg_low;
        let (top, bottom) = match shift.side {
            Side::Long => (
                shift.leg_high - self.params.ote_low * leg,
                shift.leg_high - self.params.ote_high * leg,
            ),
            Side::Short => (
                shift.leg_low + self.params.ote_high * leg,
                shift.leg_low + self.params.ote_low * leg,
            ),
        };
        OteZone {
            shift_index: shift.index,
            side: shift.side,
            top,
            bottom,
        }
    }
}

impl Default for IctStrategy {
    fn default() -> Self {
        Self::new(IctParams::default())
    }
}

impl Strategy for IctStrategy {
    fn name(&self) -> &str {
        "ict"
    }

    fn on_bar(&mut self, bars: &BarView<'_>) -> Result<Vec<Signal>, StrategyError> {
        let base = window_base(bars, self.params.window);
        let window = bars.tail(self.params.window);
        let Some(current) = window.last() else {
            return Ok(Vec::new());
        };
        let last = window.len() - 1;
        let mut signals = Vec::new();

        if let Some(shift) = self.detect_market_structure_shift(window).last() {
            let shift_index = base + shift.index;
            if self.last_shift.map_or(true, |seen| shift_index > seen) {
                self.last_shift = Some(shift_index);
                self.setup = Some(Setup {
                    zone: self.ote_zone(shift),
                    swing_index: base + shift.swing_index,
                    shift_index,
                    invalidation: match shift.side {
                        Side::Long => shift.leg_low,
                        Side::Short => shift.leg_high,
                    },
                });
                if shift.index == last {
                    signals.push(Signal::exit(
                        shift.side.opposite(),
                        current.close,
                        "structure_shift",
                    ));
                }
            }
        }

        let Some(setup) = self.setup else {
            return Ok(signals);
        };
        if base + last <= setup.shift_index {
            return Ok(signals);
        }

        let side = setup.zone.side;
        let invalidated = match side {
            Side::Long => current.close < setup.invalidation,
            Side::Short => current.close > setup.invalidation,
        };
        if invalidated {
            self.setup = None;
        } else if setup.zone.touched_by(current) {
            let confluence = self.detect_fair_value_gap(window).iter().any(|gap| {
                gap.side == side && (setup.swing_index..=setup.shift_index).contains(&(base + gap.index))
            });
            let strength = if confluence { 1.0 } else { 0.6 };
            let price = match side {
                Side::Long => setup.zone.top,
                Side::Short => setup.zone.bottom,
            };
            signals.push(Signal::entry(side, price, "ote_entry").with_strength(strength));
            self.setup = None;
        }

        Ok(signals)
    }
}
