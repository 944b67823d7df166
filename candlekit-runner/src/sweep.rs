//! Parallel execution of independent runs over one shared series.
//!
//! The series is borrowed read-only by every worker; each run builds its own
//! strategy and engine state. Output order matches input order regardless of
//! scheduling.

use rayon::prelude::*;
use tracing::info;

use candlekit_core::domain::BarSeries;
use candlekit_core::strategies::StrategyConfig;

use crate::config::BacktestConfig;
use crate::runner::{run_backtest_with, BacktestResult, RunError};

/// Run every config over `series` on the rayon pool.
pub fn run_parallel(
    configs: &[BacktestConfig],
    series: &BarSeries,
) -> Vec<Result<BacktestResult, RunError>> {
    info!(runs = configs.len(), bars = series.len(), "parallel runs started");
    configs
        .par_iter()
        .map(|config| run_backtest_with(config, series))
        .collect()
}

/// One config per strategy, sharing the engine settings of `base`.
pub fn with_strategies(base: &BacktestConfig, strategies: &[StrategyConfig]) -> Vec<BacktestConfig> {
    strategies
        .iter()
        .map(|strategy| BacktestConfig::new(base.backtest.clone(), strategy.clone()))
        .collect()
}
