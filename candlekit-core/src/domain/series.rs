//! Bar series and bounded views over it.
//!
//! A `BarSeries` is validated once at construction and never mutated. The
//! engine hands strategies a `BarView` produced by `prefix(i)`, which ends at
//! bar `i`: there is no way to reach bar `i + 1` through a view.

use std::ops::Deref;

use serde::Serialize;
use thiserror::Error;

use super::bar::Bar;

/// Errors raised when building or indexing a series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("invalid data at bar {index}: {reason}")]
    InvalidData { index: usize, reason: String },
    #[error("index {index} out of range for series of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Immutable, strictly time-ordered sequence of bars.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series, checking OHLC sanity on every bar and strictly
    /// increasing timestamps.
    pub fn new(bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(SeriesError::InvalidData {
                    index,
                    reason: format!(
                        "OHLC invariant violated (o={}, h={}, l={}, c={})",
                        bar.open, bar.high, bar.low, bar.close
                    ),
                });
            }
        }
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::InvalidData {
                    index: index + 1,
                    reason: format!(
                        "timestamp {} does not follow {}",
                        pair[1].timestamp, pair[0].timestamp
                    ),
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn at(&self, index: usize) -> Result<&Bar, SeriesError> {
        self.bars.get(index).ok_or(SeriesError::IndexOutOfRange {
            index,
            len: self.bars.len(),
        })
    }

    /// View of bars `[0..=index]`.
    pub fn prefix(&self, index: usize) -> Result<BarView<'_>, SeriesError> {
        self.view().prefix(index)
    }

    /// View over the whole series.
    pub fn view(&self) -> BarView<'_> {
        BarView { bars: &self.bars }
    }

    /// Every prefix view in increasing order: `[0..=0]`, `[0..=1]`, ...
    pub fn prefixes(&self) -> impl Iterator<Item = BarView<'_>> + '_ {
        (1..=self.bars.len()).map(move |end| BarView {
            bars: &self.bars[..end],
        })
    }
}

impl Deref for BarSeries {
    type Target = [Bar];

    fn deref(&self) -> &[Bar] {
        &self.bars
    }
}

/// Read-only window onto the start of a series.
///
/// Derefs to `&[Bar]` so every indicator function accepts it directly.
#[derive(Debug, Clone, Copy)]
pub struct BarView<'a> {
    bars: &'a [Bar],
}

impl<'a> BarView<'a> {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn at(&self, index: usize) -> Result<&'a Bar, SeriesError> {
        self.bars.get(index).ok_or(SeriesError::IndexOutOfRange {
            index,
            len: self.bars.len(),
        })
    }

    /// The most recent bar visible in this view.
    pub fn last(&self) -> Option<&'a Bar> {
        self.bars.last()
    }

    /// Index of the most recent bar, i.e. the engine's current bar index.
    pub fn current_index(&self) -> Option<usize> {
        self.bars.len().checked_sub(1)
    }

    /// Narrower view of bars `[0..=index]`.
    pub fn prefix(&self, index: usize) -> Result<BarView<'a>, SeriesError> {
        if index >= self.bars.len() {
            return Err(SeriesError::IndexOutOfRange {
                index,
                len: self.bars.len(),
            });
        }
        Ok(BarView {
            bars: &self.bars[..=index],
        })
    }

    /// The last `n` bars (or fewer if the view is shorter).
    pub fn tail(&self, n: usize) -> &'a [Bar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }

    pub fn as_slice(&self) -> &'a [Bar] {
        self.bars
    }
}

impl Deref for BarView<'_> {
    type Target = [Bar];

    fn deref(&self) -> &[Bar] {
        self.bars
    }
}
