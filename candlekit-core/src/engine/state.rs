//! Engine configuration, mutable state, and run result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Bar, ExitReason, Position, Signal, Trade};
use crate::risk::{OrderIntent, RiskParams};

use super::EngineError;

/// How an entry signal is turned into a fill price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillModel {
    /// Fill at the close of the signal bar.
    #[default]
    Close,
    /// Fill at the signal's reference price, clamped into the bar's range.
    Reference,
}

impl FillModel {
    pub fn entry_price(self, signal: &Signal, bar: &Bar) -> f64 {
        match self {
            FillModel::Close => bar.close,
            FillModel::Reference => signal.reference_price.clamp(bar.low, bar.high),
        }
    }
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_balance: f64,
    #[serde(flatten)]
    pub risk: RiskParams,
    /// Fraction of notional charged on each side of a trade.
    pub fee_rate: f64,
    pub fill: FillModel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            risk: RiskParams::default(),
            fee_rate: 0.0,
            fill: FillModel::Close,
        }
    }
}

impl EngineConfig {
    pub fn new(initial_balance: f64, risk: RiskParams) -> Self {
        Self {
            initial_balance,
            risk,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.initial_balance.is_finite() && self.initial_balance > 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "initial_balance must be > 0, got {}",
                self.initial_balance
            )));
        }
        if !(self.fee_rate.is_finite() && (0.0..1.0).contains(&self.fee_rate)) {
            return Err(EngineError::InvalidConfig(format!(
                "fee_rate must be within [0, 1), got {}",
                self.fee_rate
            )));
        }
        self.risk
            .validate()
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))
    }
}

/// Global lifecycle of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    #[default]
    Idle,
    Running,
    Finished,
    Aborted,
}

/// Mark-to-market equity at one bar close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

/// Mutable state that evolves bar-by-bar during the engine loop.
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Realized account balance. Changes only when a trade closes.
    pub balance: f64,
    pub position: Option<Position>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub signal_count: usize,
    pub phase: EnginePhase,
}

impl EngineState {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            signal_count: 0,
            phase: EnginePhase::Idle,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// Balance plus open P&L at `price`, net of the entry fee already paid.
    pub fn equity(&self, price: f64) -> f64 {
        match &self.position {
            Some(pos) => self.balance + pos.unrealized_pnl(price) - pos.entry_fee,
            None => self.balance,
        }
    }

    pub fn open_position(&mut self, index: usize, bar: &Bar, intent: OrderIntent, fee_rate: f64) {
        debug!(
            bar = index,
            side = ?intent.side,
            entry = intent.entry,
            size = intent.size,
            stop_loss = intent.stop_loss,
            take_profit = intent.take_profit,
            "position opened"
        );
        self.position = Some(Position {
            side: intent.side,
            entry_price: intent.entry,
            size: intent.size,
            stop_loss: intent.stop_loss,
            take_profit: intent.take_profit,
            opened_at_index: index,
            opened_at: bar.timestamp,
            entry_fee: fee_rate * intent.entry * intent.size,
        });
    }

    /// Close the open position at `price`, book the trade and settle the
    /// balance. No-op when flat.
    pub fn close_position(
        &mut self,
        index: usize,
        bar: &Bar,
        price: f64,
        reason: ExitReason,
        fee_rate: f64,
    ) {
        let Some(pos) = self.position.take() else {
            return;
        };
        let gross_pnl = pos.unrealized_pnl(price);
        let fees = pos.entry_fee + fee_rate * price * pos.size;
        let pnl = gross_pnl - fees;
        self.balance += pnl;

        debug!(bar = index, side = ?pos.side, exit = price, ?reason, pnl, "position closed");

        self.trades.push(Trade {
            side: pos.side,
            entry_index: pos.opened_at_index,
            entry_time: pos.opened_at,
            entry_price: pos.entry_price,
            stop_loss: pos.stop_loss,
            take_profit: pos.take_profit,
            exit_index: index,
            exit_time: bar.timestamp,
            exit_price: price,
            exit_reason: reason,
            size: pos.size,
            gross_pnl,
            fees,
            pnl,
            bars_held: pos.bars_held(index),
        });
    }

    pub fn record_equity(&mut self, index: usize, bar: &Bar) {
        let equity = self.equity(bar.close);
        self.equity_curve.push(EquityPoint {
            index,
            timestamp: bar.timestamp,
            equity,
        });
    }

    pub fn into_result(self, strategy: &str, bar_count: usize) -> RunResult {
        RunResult {
            strategy: strategy.to_string(),
            trades: self.trades,
            equity_curve: self.equity_curve,
            final_balance: self.balance,
            bar_count,
            signal_count: self.signal_count,
            phase: self.phase,
        }
    }
}

/// Result of a backtest run (complete, or partial when aborted).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub strategy: String,
    /// Closed trades in exit order.
    pub trades: Vec<Trade>,
    /// One point per processed bar.
    pub equity_curve: Vec<EquityPoint>,
    pub final_balance: f64,
    /// Bars fully processed.
    pub bar_count: usize,
    /// Signals emitted by the strategy, acted on or not.
    pub signal_count: usize,
    pub phase: EnginePhase,
}
