//! Bar loading for the runner.
//!
//! Two sources:
//! 1. CSV files with a `timestamp,open,high,low,close[,volume]` header
//! 2. Synthetic random walks, seeded, for demos and benchmarks
//!
//! Both produce a validated `BarSeries`; OHLC and ordering checks happen in
//! `BarSeries::new`, not here.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use candlekit_core::domain::{Bar, BarSeries, SeriesError};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unrecognized timestamp '{value}'")]
    Timestamp { row: usize, value: String },
    #[error(transparent)]
    Series(#[from] SeriesError),
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

/// Load a CSV file into a validated series.
pub fn load_csv(path: &Path) -> Result<BarSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = read_csv(file)?;
    debug!(path = %path.display(), bars = series.len(), "loaded csv");
    Ok(series)
}

/// Parse CSV from any reader. Rows are numbered from 0, header excluded.
pub fn read_csv<R: Read>(reader: R) -> Result<BarSeries, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (row, record) in reader.deserialize::<CsvRow>().enumerate() {
        let record = record?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            row,
            value: record.timestamp.clone(),
        })?;
        let bar = Bar::new(timestamp, record.open, record.high, record.low, record.close);
        bars.push(match record.volume {
            Some(volume) => bar.with_volume(volume),
            None => bar,
        });
    }

    Ok(BarSeries::new(bars)?)
}

/// RFC 3339, epoch milliseconds, or a bare `YYYY-MM-DD` date (midnight UTC).
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(millis) = value.parse::<i64>() {
        return Utc.timestamp_millis_opt(millis).single();
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 2024-01-01T00:00:00Z, the first synthetic timestamp.
const SYNTHETIC_START_SECS: i64 = 1_704_067_200;

/// Deterministic hourly random walk starting at 100.0.
///
/// The same `(n, seed)` always yields the same bars.
pub fn synthetic_series(n: usize, seed: u64) -> Result<BarSeries, LoadError> {
    let seed_bytes = blake3::hash(&seed.to_le_bytes());
    let mut rng = StdRng::from_seed(*seed_bytes.as_bytes());

    let start = DateTime::<Utc>::default() + Duration::seconds(SYNTHETIC_START_SECS);
    let mut price = 100.0_f64;
    let mut bars = Vec::with_capacity(n);

    for i in 0..n {
        let change: f64 = rng.gen_range(-0.015..0.015);
        let open = price;
        let close = (price * (1.0 + change)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.006));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.006));
        let volume = rng.gen_range(1_000.0..50_000.0);

        bars.push(
            Bar::new(start + Duration::hours(i as i64), open, high, low, close).with_volume(volume),
        );
        price = close;
    }

    Ok(BarSeries::new(bars)?)
}
