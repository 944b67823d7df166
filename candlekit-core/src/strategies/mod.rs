//! Strategy interface and the built-in strategy families.
//!
//! A strategy sees the market one bar at a time through a `BarView` that ends
//! at the current bar, and answers with zero or more signals. It never sees
//! the account, the open position, or any bar after the current one.
//!
//! Each family also exposes its pattern detectors as plain methods over
//! `&[Bar]`. Every detector returns an empty `Vec` when nothing is confirmed;
//! "no pattern" is the common case and is never reported as an error.

pub mod crt;
pub mod factory;
pub mod ict;
pub mod smc;
pub mod structure;

pub use crt::{CandleRange, CrtParams, CrtStrategy, PriceReaction, StrongBody, WickRejection};
pub use factory::{create_strategy, FactoryError, StrategyConfig};
pub use ict::{FairValueGap, IctParams, IctStrategy, OteZone, StructureShift};
pub use smc::{LiquidityGrab, OrderBlock, SmcParams, SmcStrategy};
pub use structure::{
    ChangeOfCharacter, Level, LevelKind, MarketStructureStrategy, StructureLabel, StructureParams,
    SwingLabel, Trendline,
};

use thiserror::Error;

use crate::domain::{BarView, SeriesError, Signal};
use crate::indicators::IndicatorError;
use crate::risk::RiskError;

/// A fault inside a strategy. Any of these aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error(transparent)]
    Risk(#[from] RiskError),
    #[error("{0}")]
    Logic(String),
}

/// Bar-driven signal producer.
///
/// # Contract
/// - `on_bar` is called exactly once per bar index, in increasing order.
/// - `bars` ends at the current bar; `bars.last()` is the bar being processed.
/// - Output must depend only on `bars` and on state built from earlier calls.
/// - `Ok(vec![])` means "nothing to do"; `Err` means the strategy is broken.
pub trait Strategy: Send {
    /// Human-readable name (e.g. "smc").
    fn name(&self) -> &str;

    fn on_bar(&mut self, bars: &BarView<'_>) -> Result<Vec<Signal>, StrategyError>;
}

/// Strategy that never signals. Baseline for engine tests and benchmarks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStrategy;

impl Strategy for NullStrategy {
    fn name(&self) -> &str {
        "null"
    }

    fn on_bar(&mut self, _bars: &BarView<'_>) -> Result<Vec<Signal>, StrategyError> {
        Ok(Vec::new())
    }
}

/// Offset that maps an index inside `window` back to the full view.
///
/// Strategies run their detectors over `bars.tail(window)`; a pattern found
/// at local index `i` sits at `window_base(bars, window) + i` in the view.
pub(crate) fn window_base(bars: &BarView<'_>, window: usize) -> usize {
    bars.len().saturating_sub(window)
}
