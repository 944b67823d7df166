//! Open position state. Owned and mutated only by the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bar::Bar;
use super::signal::Side;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    pub size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub opened_at_index: usize,
    pub opened_at: DateTime<Utc>,
    /// Fee paid on entry, settled when the position closes.
    pub entry_fee: f64,
}

impl Position {
    /// P&L before fees if the position were closed at `price`.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.side.sign() * (price - self.entry_price) * self.size
    }

    /// Fill price of the protective stop on `bar`, if the bar reached it.
    ///
    /// A bar that opens beyond the stop fills at the open (gap rule).
    pub fn stop_fill(&self, bar: &Bar) -> Option<f64> {
        match self.side {
            Side::Long if bar.low <= self.stop_loss => Some(self.stop_loss.min(bar.open)),
            Side::Short if bar.high >= self.stop_loss => Some(self.stop_loss.max(bar.open)),
            _ => None,
        }
    }

    /// Fill price of the profit target on `bar`, if the bar reached it.
    ///
    /// A bar that opens beyond the target fills at the open.
    pub fn target_fill(&self, bar: &Bar) -> Option<f64> {
        match self.side {
            Side::Long if bar.high >= self.take_profit => Some(self.take_profit.max(bar.open)),
            Side::Short if bar.low <= self.take_profit => Some(self.take_profit.min(bar.open)),
            _ => None,
        }
    }

    pub fn bars_held(&self, current_index: usize) -> usize {
        current_index.saturating_sub(self.opened_at_index)
    }
}
