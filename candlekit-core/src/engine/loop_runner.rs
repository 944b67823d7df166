//! Bar-by-bar event loop.
//!
//! The strategy is called exactly once per bar, before any position
//! bookkeeping, so it observes every bar whether flat or in a position. Exit
//! priority on a bar is fixed: stop-loss, take-profit, then exit signal. Once
//! the exits have run, a flat engine takes the bar's first entry signal, so a
//! strategy can close one side and open the other on the same bar.

use tracing::{debug, info, warn};

use crate::domain::{BarSeries, ExitReason};
use crate::strategies::{Strategy, StrategyError};

use super::state::{EngineConfig, EnginePhase, EngineState, RunResult};
use super::{EngineError, RunAborted};

/// Run `strategy` over `series` with `config`.
///
/// Fails with `InvalidConfig` before the first bar, or with
/// `StrategyFailure` at the bar where the strategy (or the sizing of one of
/// its signals) failed. An empty series yields an empty, finished result.
pub fn run_backtest(
    series: &BarSeries,
    strategy: &mut dyn Strategy,
    config: &EngineConfig,
) -> Result<RunResult, EngineError> {
    config.validate()?;

    let name = strategy.name().to_string();
    let mut state = EngineState::new(config.initial_balance);
    state.equity_curve.reserve(series.len());
    state.phase = EnginePhase::Running;

    info!(
        strategy = %name,
        bars = series.len(),
        initial_balance = config.initial_balance,
        "backtest started"
    );

    let last_index = series.len().saturating_sub(1);

    for (i, prefix) in series.prefixes().enumerate() {
        let bar = &series[i];

        // ─── Strategy ───
        let signals = match strategy.on_bar(&prefix) {
            Ok(signals) => signals,
            Err(cause) => return Err(abort(state, &name, i, cause)),
        };
        state.signal_count += signals.len();

        // ─── Exits ───
        if let Some(pos) = &state.position {
            let exit = pos
                .stop_fill(bar)
                .map(|price| (price, ExitReason::StopLoss))
                .or_else(|| pos.target_fill(bar).map(|price| (price, ExitReason::TakeProfit)))
                .or_else(|| {
                    signals
                        .iter()
                        .any(|s| s.closes(pos.side))
                        .then_some((bar.close, ExitReason::SignalExit))
                });
            if let Some((price, reason)) = exit {
                state.close_position(i, bar, price, reason, config.fee_rate);
            }
        }

        // ─── Entries ───
        if state.is_flat() {
            if let Some(signal) = signals.iter().find(|s| s.is_entry()) {
                let entry = config.fill.entry_price(signal, bar);
                match config.risk.intent(state.balance, signal.side, entry) {
                    Ok(intent) => state.open_position(i, bar, intent, config.fee_rate),
                    Err(e) => return Err(abort(state, &name, i, StrategyError::Risk(e))),
                }
            }
        } else if signals.iter().any(|s| s.is_entry()) {
            debug!(bar = i, "entry ignored, position still open");
        }

        // ─── End of data ───
        if i == last_index {
            state.close_position(i, bar, bar.close, ExitReason::EndOfData, config.fee_rate);
        }

        // ─── Mark-to-market ───
        state.record_equity(i, bar);
        debug_assert_eq!(state.equity_curve.len(), i + 1);
    }

    state.phase = EnginePhase::Finished;
    info!(
        strategy = %name,
        trades = state.trades.len(),
        signals = state.signal_count,
        final_balance = state.balance,
        "backtest finished"
    );

    Ok(state.into_result(&name, series.len()))
}

fn abort(mut state: EngineState, strategy: &str, bar_index: usize, cause: StrategyError) -> EngineError {
    state.phase = EnginePhase::Aborted;
    warn!(strategy, bar = bar_index, error = %cause, "backtest aborted");
    EngineError::StrategyFailure(Box::new(RunAborted {
        strategy: strategy.to_string(),
        bar_index,
        cause,
        partial: state.into_result(strategy, bar_index),
    }))
}
