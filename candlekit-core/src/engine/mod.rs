//! Backtesting engine: the bar-by-bar loop and its state.
//!
//! One run drives one strategy over one series. Per bar:
//!
//! 1. Strategy: `on_bar` over the prefix ending at this bar
//! 2. Exits: stop-loss, then take-profit, then an exit signal
//! 3. Entries: first entry signal, if flat once the exits have run
//! 4. End of data: force-close at the last close
//! 5. Mark-to-market: record equity at the close

pub mod loop_runner;
pub mod state;

pub use loop_runner::run_backtest;
pub use state::{EngineConfig, EnginePhase, EngineState, EquityPoint, FillModel, RunResult};

use thiserror::Error;

use crate::strategies::StrategyError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Rejected before the first bar; no run took place.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    StrategyFailure(Box<RunAborted>),
}

impl EngineError {
    /// Partial results of an aborted run, if the run had started.
    pub fn partial(&self) -> Option<&RunResult> {
        match self {
            EngineError::StrategyFailure(aborted) => Some(&aborted.partial),
            EngineError::InvalidConfig(_) => None,
        }
    }
}

/// A run stopped by a strategy fault. Everything booked before the failing
/// bar is kept in `partial`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("strategy '{strategy}' failed at bar {bar_index}: {cause}")]
pub struct RunAborted {
    pub strategy: String,
    pub bar_index: usize,
    #[source]
    pub cause: StrategyError,
    pub partial: RunResult,
}
