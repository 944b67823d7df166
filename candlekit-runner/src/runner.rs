//! Backtest runner: wires config, strategy factory, engine and metrics.
//!
//! A strategy fault is not a runner error. The engine keeps everything booked
//! before the failing bar, and the runner reports it as a normal result with
//! `abort_reason` set. Only configuration problems fail the call.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use candlekit_core::domain::{BarSeries, Trade};
use candlekit_core::engine::{run_backtest, EngineError, EnginePhase, EquityPoint, RunResult};
use candlekit_core::strategies::{create_strategy, FactoryError};

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::metrics::Summary;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("strategy error: {0}")]
    Strategy(#[from] FactoryError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub run_id: RunId,
    pub strategy: String,
    pub summary: Summary,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub bar_count: usize,
    pub signal_count: usize,
    pub phase: EnginePhase,
    /// Set when the strategy failed mid-run; results cover bars before it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<String>,
}

impl BacktestResult {
    fn from_run(
        run_id: RunId,
        run: RunResult,
        initial_balance: f64,
        abort_reason: Option<String>,
    ) -> Self {
        let summary = Summary::compute(
            &run.trades,
            &run.equity_curve,
            initial_balance,
            run.final_balance,
        );
        Self {
            run_id,
            strategy: run.strategy,
            summary,
            trades: run.trades,
            equity_curve: run.equity_curve,
            bar_count: run.bar_count,
            signal_count: run.signal_count,
            phase: run.phase,
            abort_reason,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.abort_reason.is_some()
    }
}

/// Run one configured backtest over `series`. No I/O.
pub fn run_backtest_with(
    config: &BacktestConfig,
    series: &BarSeries,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let run_id = config.run_id();
    let mut strategy = create_strategy(&config.strategy)?;
    let initial_balance = config.backtest.initial_balance;
    debug!(run_id = %run_id, strategy = config.strategy.name(), "run configured");

    match run_backtest(series, &mut *strategy, &config.backtest) {
        Ok(run) => Ok(BacktestResult::from_run(run_id, run, initial_balance, None)),
        Err(EngineError::StrategyFailure(aborted)) => {
            let reason = aborted.to_string();
            warn!(run_id = %run_id, reason = %reason, "run kept partial results");
            Ok(BacktestResult::from_run(
                run_id,
                aborted.partial,
                initial_balance,
                Some(reason),
            ))
        }
        Err(e) => Err(e.into()),
    }
}
