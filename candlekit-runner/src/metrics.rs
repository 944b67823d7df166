//! Run summary: pure functions over trades and the equity curve.
//!
//! No dependency on the engine loop. Everything here reads finished output
//! and returns a scalar.

use serde::{Deserialize, Serialize};

use candlekit_core::domain::Trade;
use candlekit_core::engine::EquityPoint;

/// Aggregate statistics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub trade_count: usize,
    pub wins: usize,
    pub losses: usize,
    /// Winners over all trades; 0.0 with no trades.
    pub win_rate: f64,
    /// Sum of net trade P&L.
    pub total_pnl: f64,
    pub avg_pnl: f64,
    /// Gross profit over gross loss, capped at 100.
    pub profit_factor: f64,
    /// Largest peak-to-trough equity drop, in account currency (>= 0).
    pub max_drawdown: f64,
    /// Largest peak-to-trough equity drop as a fraction of the peak (>= 0).
    pub max_drawdown_pct: f64,
    pub avg_bars_held: f64,
    pub final_balance: f64,
    /// (final - initial) / initial.
    pub total_return: f64,
}

impl Summary {
    pub fn compute(
        trades: &[Trade],
        equity_curve: &[EquityPoint],
        initial_balance: f64,
        final_balance: f64,
    ) -> Self {
        let (max_drawdown, max_drawdown_pct) = max_drawdown(equity_curve, initial_balance);
        let wins = trades.iter().filter(|t| t.is_winner()).count();
        let losses = trades.iter().filter(|t| t.pnl < 0.0).count();
        Self {
            trade_count: trades.len(),
            wins,
            losses,
            win_rate: win_rate(trades),
            total_pnl: total_pnl(trades),
            avg_pnl: avg_pnl(trades),
            profit_factor: profit_factor(trades),
            max_drawdown,
            max_drawdown_pct,
            avg_bars_held: avg_bars_held(trades),
            final_balance,
            total_return: total_return(initial_balance, final_balance),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn total_pnl(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pnl).sum()
}

pub fn avg_pnl(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    total_pnl(trades) / trades.len() as f64
}

/// Fraction of trades with positive net P&L. Breakeven trades count as
/// neither win nor loss but stay in the denominator.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Profit factor: gross profits / gross losses.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl < 0.0)
        .map(|t| t.pnl.abs())
        .sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Absolute and fractional maximum drawdown.
///
/// The running peak starts at `initial_balance`, so a loss on the very first
/// bar counts as drawdown.
pub fn max_drawdown(equity_curve: &[EquityPoint], initial_balance: f64) -> (f64, f64) {
    let mut peak = initial_balance;
    let mut max_abs = 0.0_f64;
    let mut max_pct = 0.0_f64;

    for point in equity_curve {
        peak = peak.max(point.equity);
        let drop = peak - point.equity;
        max_abs = max_abs.max(drop);
        if peak > 0.0 {
            max_pct = max_pct.max(drop / peak);
        }
    }
    (max_abs, max_pct)
}

pub fn avg_bars_held(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.bars_held as f64).sum::<f64>() / trades.len() as f64
}

pub fn total_return(initial_balance: f64, final_balance: f64) -> f64 {
    if initial_balance <= 0.0 {
        return 0.0;
    }
    (final_balance - initial_balance) / initial_balance
}
