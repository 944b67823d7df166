//! candlekit runner: configuration, data loading, orchestration, metrics.
//!
//! This crate builds on `candlekit-core` to provide:
//! - TOML run configuration with content-addressed run ids
//! - CSV and synthetic bar loading
//! - Single-run orchestration with summary statistics
//! - Parallel runs of independent configs over one shared series

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{load_csv, read_csv, synthetic_series, LoadError};
pub use metrics::Summary;
pub use runner::{run_backtest_with, BacktestResult, RunError};
pub use sweep::{run_parallel, with_strategies};
