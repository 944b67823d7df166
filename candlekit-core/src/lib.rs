//! candlekit core: bar series, indicators, strategies, risk model, engine.
//!
//! This crate contains the deterministic heart of the backtester:
//! - Domain types (bars, series and prefix views, signals, positions, trades)
//! - Pure indicator functions over bar slices
//! - The `Strategy` trait and four pattern-detection families
//! - Fixed-fractional position sizing with percentage stops and targets
//! - A bar-by-bar engine that never lets a strategy see past the current bar

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod risk;
pub mod strategies;
