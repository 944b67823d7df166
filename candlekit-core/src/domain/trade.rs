//! Trade: an immutable record of a closed position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::Side;

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    SignalExit,
    EndOfData,
}

/// A complete round trip: entry → exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub side: Side,

    // ── Entry ──
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    pub size: f64,

    // ── PnL ──
    pub gross_pnl: f64,
    /// Entry plus exit fees.
    pub fees: f64,
    /// Net of fees.
    pub pnl: f64,

    pub bars_held: usize,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}
