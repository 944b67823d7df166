//! Bar: one OHLC price observation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLC(V) bar for one fixed time interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Bar {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Returns true if every price is finite and
    /// `low <= min(open, close) <= max(open, close) <= high`.
    pub fn is_sane(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return false;
        }
        if self.volume.is_some_and(|v| !v.is_finite() || v < 0.0) {
            return false;
        }
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Upper edge of the candle body.
    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    /// Lower edge of the candle body.
    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bar() -> Bar {
        Bar::new(
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            100.0,
            110.0,
            95.0,
            105.0,
        )
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_nan() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_high_below_body() {
        let mut bar = sample_bar();
        bar.high = 104.0; // below close
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_low_above_body() {
        let mut bar = sample_bar();
        bar.low = 101.0; // above open
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_rejects_negative_volume() {
        let bar = sample_bar().with_volume(-1.0);
        assert!(!bar.is_sane());
    }

    #[test]
    fn doji_is_neither_bullish_nor_bearish() {
        let mut bar = sample_bar();
        bar.close = bar.open;
        assert!(!bar.is_bullish());
        assert!(!bar.is_bearish());
        assert!(bar.is_sane());
    }

    #[test]
    fn body_edges() {
        let bar = sample_bar();
        assert_eq!(bar.body_top(), 105.0);
        assert_eq!(bar.body_bottom(), 100.0);
    }

    #[test]
    fn volume_is_optional_in_json() {
        let json = r#"{"timestamp":"2024-01-02T00:00:00Z","open":1.0,"high":2.0,"low":0.5,"close":1.5}"#;
        let bar: Bar = serde_json::from_str(json).unwrap();
        assert_eq!(bar.volume, None);
        assert!(bar.is_sane());
    }
}
