//! Position sizing and stop/target placement.
//!
//! Fixed-fractional risk: every trade risks `risk_pct` percent of the current
//! balance between entry and stop.
//!
//! # Formula
//! ```text
//! risk_amount = balance * risk_pct / 100
//! size        = risk_amount / |entry - stop_loss|
//! ```
//!
//! # Example
//! - Balance: 1000, risk 1% → risk_amount 10
//! - Entry 110, stop 105 → distance 5
//! - Size: 10 / 5 = 2 units

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Side;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    #[error("invalid risk: {0}")]
    InvalidRisk(String),
}

fn invalid(reason: impl Into<String>) -> RiskError {
    RiskError::InvalidRisk(reason.into())
}

/// Units to trade so that a stop-out loses `risk_pct` percent of `balance`.
pub fn position_size(
    balance: f64,
    risk_pct: f64,
    entry: f64,
    stop_loss: f64,
) -> Result<f64, RiskError> {
    if !(balance.is_finite() && risk_pct.is_finite() && entry.is_finite() && stop_loss.is_finite())
    {
        return Err(invalid("non-finite sizing input"));
    }
    if risk_pct <= 0.0 {
        return Err(invalid(format!("risk_pct must be > 0, got {risk_pct}")));
    }
    let distance = (entry - stop_loss).abs();
    if distance == 0.0 {
        return Err(invalid(format!("entry equals stop loss ({entry})")));
    }
    let risk_amount = balance * risk_pct / 100.0;
    Ok(risk_amount / distance)
}

/// Stop-loss and take-profit levels at fixed percentages from `entry`.
///
/// Long: stop below, target above. Short: mirrored.
pub fn stop_take(
    entry: f64,
    sl_pct: f64,
    tp_pct: f64,
    side: Side,
) -> Result<(f64, f64), RiskError> {
    if sl_pct < 0.0 || tp_pct < 0.0 || !sl_pct.is_finite() || !tp_pct.is_finite() {
        return Err(invalid(format!(
            "percentages must be finite and >= 0 (sl={sl_pct}, tp={tp_pct})"
        )));
    }
    let levels = match side {
        Side::Long => (entry * (1.0 - sl_pct / 100.0), entry * (1.0 + tp_pct / 100.0)),
        Side::Short => (entry * (1.0 + sl_pct / 100.0), entry * (1.0 - tp_pct / 100.0)),
    };
    Ok(levels)
}

/// Per-run risk parameters, all in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    pub risk_pct: f64,
    pub sl_pct: f64,
    pub tp_pct: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            risk_pct: 1.0,
            sl_pct: 1.0,
            tp_pct: 2.0,
        }
    }
}

impl RiskParams {
    /// Reject parameter sets that would fail on every signal.
    ///
    /// `sl_pct == 0` is accepted by `stop_take` but makes every size
    /// undefined, so it is refused here.
    pub fn validate(&self) -> Result<(), RiskError> {
        if !(self.risk_pct.is_finite() && self.risk_pct > 0.0) {
            return Err(invalid(format!("risk_pct must be > 0, got {}", self.risk_pct)));
        }
        if !(self.sl_pct.is_finite() && self.sl_pct > 0.0) {
            return Err(invalid(format!("sl_pct must be > 0, got {}", self.sl_pct)));
        }
        if !(self.tp_pct.is_finite() && self.tp_pct >= 0.0) {
            return Err(invalid(format!("tp_pct must be >= 0, got {}", self.tp_pct)));
        }
        Ok(())
    }

    /// Turn a signal direction and fill price into a sized order.
    pub fn intent(&self, balance: f64, side: Side, entry: f64) -> Result<OrderIntent, RiskError> {
        let (stop_loss, take_profit) = stop_take(entry, self.sl_pct, self.tp_pct, side)?;
        let size = position_size(balance, self.risk_pct, entry, stop_loss)?;
        if size <= 0.0 {
            return Err(invalid(format!("non-positive size {size} at balance {balance}")));
        }
        Ok(OrderIntent {
            side,
            entry,
            size,
            stop_loss,
            take_profit,
        })
    }
}

/// A fully specified order the engine can fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub side: Side,
    pub entry: f64,
    pub size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}
