//! Market-structure strategy.
//!
//! Confirmed swings are labelled against the previous swing of the same kind
//! (HH/LH for highs, HL/LL for lows). A higher high puts the market in an
//! uptrend, a lower low in a downtrend; a flip between the two is a change of
//! character and is traded in the new direction.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, BarView, Side, Signal};
use crate::indicators::{swing_points, SwingKind, SwingPoint};

use super::{Strategy, StrategyError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureParams {
    pub swing_strength: usize,
    /// Swings within this percentage of each other form one level.
    pub level_tolerance_pct: f64,
    pub min_touches: usize,
    pub window: usize,
}

impl Default for StructureParams {
    fn default() -> Self {
        Self {
            swing_strength: 3,
            level_tolerance_pct: 0.5,
            min_touches: 2,
            window: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingLabel {
    HigherHigh,
    LowerHigh,
    HigherLow,
    LowerLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureLabel {
    pub index: usize,
    pub price: f64,
    pub label: SwingLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeOfCharacter {
    /// Index of the swing that flipped the trend.
    pub index: usize,
    /// First bar on which that swing is confirmed.
    pub confirmed_at: usize,
    pub side: Side,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    Support,
    Resistance,
}

/// Line through two consecutive swings of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trendline {
    pub kind: LevelKind,
    pub from_index: usize,
    pub from_price: f64,
    pub to_index: usize,
    pub to_price: f64,
}

impl Trendline {
    pub fn slope(&self) -> f64 {
        (self.to_price - self.from_price) / (self.to_index - self.from_index) as f64
    }

    /// Line value projected to bar `index`.
    pub fn price_at(&self, index: usize) -> f64 {
        self.from_price + self.slope() * (index as f64 - self.from_index as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub kind: LevelKind,
    /// Mean price of the clustered swings.
    pub price: f64,
    pub touches: usize,
    pub first_index: usize,
    pub last_index: usize,
}

#[derive(Debug, Clone)]
pub struct MarketStructureStrategy {
    params: StructureParams,
}

impl MarketStructureStrategy {
    pub fn new(params: StructureParams) -> Self {
        Self { params }
    }

    fn swings(&self, bars: &[Bar]) -> Vec<SwingPoint> {
        swing_points(bars, self.params.swing_strength)
    }

    pub fn detect_higher_highs_lows(&self, bars: &[Bar]) -> Vec<StructureLabel> {
        let mut labels = Vec::new();
        let mut prev_high: Option<f64> = None;
        let mut prev_low: Option<f64> = None;

        for swing in self.swings(bars) {
            let (prev, up, down) = match swing.kind {
                SwingKind::High => (&mut prev_high, SwingLabel::HigherHigh, SwingLabel::LowerHigh),
                SwingKind::Low => (&mut prev_low, SwingLabel::HigherLow, SwingLabel::LowerLow),
            };
            if let Some(p) = *prev {
                let label = if swing.price > p { up } else { down };
                labels.push(StructureLabel {
                    index: swing.index,
                    price: swing.price,
                    label,
                });
            }
            *prev = Some(swing.price);
        }

        labels
    }

    /// Trend flips: a lower low during an uptrend, a higher high during a
    /// downtrend. The first HH or LL only sets the trend.
    pub fn detect_change_of_character(&self, bars: &[Bar]) -> Vec<ChangeOfCharacter> {
        let k = self.params.swing_strength.max(1);
        let mut trend: Option<Side> = None;
        let mut changes = Vec::new();

        for label in self.detect_higher_highs_lows(bars) {
            let side = match label.label {
                SwingLabel::HigherHigh => Side::Long,
                SwingLabel::LowerLow => Side::Short,
                SwingLabel::LowerHigh | SwingLabel::HigherLow => continue,
            };
            if trend == Some(side.opposite()) {
                changes.push(ChangeOfCharacter {
                    index: label.index,
                    confirmed_at: label.index + k,
                    side,
                    price: label.price,
                });
            }
            trend = Some(side);
        }

        changes
    }

    /// Support through the last two swing lows and resistance through the last
    /// two swing highs, whichever exist.
    pub fn detect_trendline(&self, bars: &[Bar]) -> Vec<Trendline> {
        let swings = self.swings(bars);
        let mut lines = Vec::new();

        for (kind, swing_kind) in [
            (LevelKind::Support, SwingKind::Low),
            (LevelKind::Resistance, SwingKind::High),
        ] {
            let mut last_two = swings.iter().rev().filter(|s| s.kind == swing_kind);
            if let (Some(to), Some(from)) = (last_two.next(), last_two.next()) {
                lines.push(Trendline {
                    kind,
                    from_index: from.index,
                    from_price: from.price,
                    to_index: to.index,
                    to_price: to.price,
                });
            }
        }

        lines
    }

    /// Horizontal levels from clustered swing prices, supports first, each
    /// group ordered by price.
    pub fn detect_support_resistance(&self, bars: &[Bar]) -> Vec<Level> {
        let swings = self.swings(bars);
        let mut levels = self.cluster(&swings, SwingKind::Low, LevelKind::Support);
        levels.extend(self.cluster(&swings, SwingKind::High, LevelKind::Resistance));
        levels
    }

    fn cluster(&self, swings: &[SwingPoint], swing_kind: SwingKind, kind: LevelKind) -> Vec<Level> {
        let mut points: Vec<SwingPoint> =
            swings.iter().filter(|s| s.kind == swing_kind).copied().collect();
        points.sort_by(|a, b| a.price.total_cmp(&b.price));

        let tolerance = self.params.level_tolerance_pct / 100.0;
        let min_touches = self.params.min_touches.max(1);
        let mut levels = Vec::new();
        let mut group: Vec<SwingPoint> = Vec::new();

        let flush = |group: &mut Vec<SwingPoint>, levels: &mut Vec<Level>| {
            if group.len() >= min_touches {
                let touches = group.len();
                levels.push(Level {
                    kind,
                    price: group.iter().map(|p| p.price).sum::<f64>() / touches as f64,
                    touches,
                    first_index: group.iter().map(|p| p.index).min().unwrap_or_default(),
                    last_index: group.iter().map(|p| p.index).max().unwrap_or_default(),
                });
            }
            group.clear();
        };

        for point in points {
            let split = group
                .first()
                .is_some_and(|anchor| point.price - anchor.price > anchor.price.abs() * tolerance);
            if split {
                flush(&mut group, &mut levels);
            }
            group.push(point);
        }
        flush(&mut group, &mut levels);

        levels
    }
}

impl Default for MarketStructureStrategy {
    fn default() -> Self {
        Self::new(StructureParams::default())
    }
}

impl Strategy for MarketStructureStrategy {
    fn name(&self) -> &str {
        "market_structure"
    }

    fn on_bar(&mut self, bars: &BarView<'_>) -> Result<Vec<Signal>, StrategyError> {
        let window = bars.tail(self.params.window);
        let Some(current) = window.last() else {
            return Ok(Vec::new());
        };
        let last = window.len() - 1;

        let Some(change) = self
            .detect_change_of_character(window)
            .into_iter()
            .find(|c| c.confirmed_at == last)
        else {
            return Ok(Vec::new());
        };

        // Closing through the opposing trendline strengthens the flip.
        let breaks_line = self.detect_trendline(window).iter().any(|line| match change.side {
            Side::Long => line.kind == LevelKind::Resistance && current.close > line.price_at(last),
            Side::Short => line.kind == LevelKind::Support && current.close < line.price_at(last),
        });
        let strength = if breaks_line { 1.0 } else { 0.7 };

        Ok(vec![
            Signal::entry(change.side, current.close, "change_of_character").with_strength(strength),
            Signal::exit(change.side.opposite(), current.close, "change_of_character"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BarSeries, SignalKind};
    use crate::indicators::{assert_approx, make_ohlc_bars};

    fn params() -> StructureParams {
        StructureParams {
            swing_strength: 1,
            ..StructureParams::default()
        }
    }

    /// Swings: H2 12.0, L4 9.0, H6 13.0, L8 9.8, H10 12.4, L11 8.0.
    fn uptrend_then_break() -> Vec<Bar> {
        make_ohlc_bars(&[
            (10.0, 10.5, 9.5, 10.0),
            (10.0, 11.0, 9.8, 10.8),
            (10.8, 12.0, 10.5, 11.8),
            (11.8, 11.9, 10.0, 10.2),
            (10.2, 10.6, 9.0, 9.5),
            (9.5, 12.5, 9.4, 12.3),
            (12.3, 13.0, 11.5, 12.8),
            (12.8, 12.9, 10.5, 10.8),
            (10.8, 11.2, 9.8, 10.0),
            (10.0, 12.0, 9.9, 11.9),
            (11.9, 12.4, 11.0, 11.2),
            (11.2, 11.4, 8.0, 8.2),
            (8.2, 9.0, 8.1, 8.8),
            (8.8, 9.2, 8.5, 9.0),
        ])
    }

    #[test]
    fn labels_swings() {
        let labels = MarketStructureStrategy::new(params()).detect_higher_highs_lows(&uptrend_then_break());
        let summary: Vec<(usize, SwingLabel)> = labels.iter().map(|l| (l.index, l.label)).collect();
        assert_eq!(
            summary,
            vec![
                (6, SwingLabel::HigherHigh),
                (8, SwingLabel::HigherLow),
                (10, SwingLabel::LowerHigh),
                (11, SwingLabel::LowerLow),
            ]
        );
    }

    #[test]
    fn lower_low_in_uptrend_is_change_of_character() {
        let changes =
            MarketStructureStrategy::new(params()).detect_change_of_character(&uptrend_then_break());
        assert_eq!(
            changes,
            vec![ChangeOfCharacter {
                index: 11,
                confirmed_at: 12,
                side: Side::Short,
                price: 8.0,
            }]
        );
    }

    #[test]
    fn no_change_before_confirmation() {
        let bars = uptrend_then_break();
        let strategy = MarketStructureStrategy::new(params());
        assert!(strategy.detect_change_of_character(&bars[..12]).is_empty());
    }

    #[test]
    fn trendlines_through_last_two_swings() {
        let lines = MarketStructureStrategy::new(params()).detect_trendline(&uptrend_then_break());
        assert_eq!(lines.len(), 2);

        let support = lines[0];
        assert_eq!(support.kind, LevelKind::Support);
        assert_eq!((support.from_index, support.to_index), (8, 11));
        assert_approx(support.slope(), -0.6, 1e-9);
        assert_approx(support.price_at(12), 7.4, 1e-9);

        let resistance = lines[1];
        assert_eq!(resistance.kind, LevelKind::Resistance);
        assert_eq!((resistance.from_index, resistance.to_index), (6, 10));
    }

    #[test]
    fn trendline_needs_two_swings() {
        let bars = uptrend_then_break();
        let lines = MarketStructureStrategy::new(params()).detect_trendline(&bars[..6]);
        assert!(lines.is_empty());
    }

    #[test]
    fn clusters_levels_within_tolerance() {
        let strategy = MarketStructureStrategy::new(StructureParams {
            swing_strength: 1,
            level_tolerance_pct: 10.0,
            min_touches: 2,
            window: 200,
        });
        let levels = strategy.detect_support_resistance(&uptrend_then_break());
        assert_eq!(levels.len(), 2);

        // 8.0 stands alone, 9.0 and 9.8 cluster
        assert_eq!(levels[0].kind, LevelKind::Support);
        assert_eq!(levels[0].touches, 2);
        assert_approx(levels[0].price, 9.4, 1e-9);
        assert_eq!((levels[0].first_index, levels[0].last_index), (4, 8));

        assert_eq!(levels[1].kind, LevelKind::Resistance);
        assert_eq!(levels[1].touches, 3);
        assert_eq!((levels[1].first_index, levels[1].last_index), (2, 10));
    }

    #[test]
    fn tight_tolerance_finds_no_levels() {
        let levels = MarketStructureStrategy::new(params()).detect_support_resistance(&uptrend_then_break());
        assert!(levels.is_empty());
    }

    #[test]
    fn on_bar_trades_the_flip() {
        let series = BarSeries::new(uptrend_then_break()).unwrap();
        let mut strategy = MarketStructureStrategy::new(params());
        for i in 0..series.len() {
            let signals = strategy.on_bar(&series.prefix(i).unwrap()).unwrap();
            if i != 12 {
                assert!(signals.is_empty(), "unexpected signal at {i}");
                continue;
            }
            assert_eq!(signals.len(), 2);
            assert_eq!(signals[0].kind, SignalKind::Entry);
            assert_eq!(signals[0].side, Side::Short);
            assert_eq!(signals[0].reference_price, 8.8);
            assert_eq!(signals[0].strength, Some(0.7));
            assert_eq!(signals[1].kind, SignalKind::Exit);
            assert_eq!(signals[1].side, Side::Long);
        }
    }
}
