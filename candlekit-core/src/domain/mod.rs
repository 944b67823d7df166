//! Domain types for candlekit

pub mod bar;
pub mod position;
pub mod series;
pub mod signal;
pub mod trade;

pub use bar::Bar;
pub use position::Position;
pub use series::{BarSeries, BarView, SeriesError};
pub use signal::{Side, Signal, SignalKind};
pub use trade::{ExitReason, Trade};
