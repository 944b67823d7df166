//! Property tests for summary statistics.

use candlekit_core::engine::EquityPoint;
use candlekit_runner::metrics::{max_drawdown, profit_factor, win_rate};
use candlekit_runner::{run_backtest_with, synthetic_series, BacktestConfig};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_equity() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..20_000.0_f64, 1..200)
}

fn to_curve(values: &[f64]) -> Vec<EquityPoint> {
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(index, &equity)| EquityPoint {
            index,
            timestamp: t0 + Duration::hours(index as i64),
            equity,
        })
        .collect()
}

// ── Drawdown ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn drawdown_is_bounded(values in arb_equity(), initial in 1.0..20_000.0_f64) {
        let (abs, pct) = max_drawdown(&to_curve(&values), initial);
        prop_assert!(abs >= 0.0);
        prop_assert!((0.0..1.0).contains(&pct));
        let peak = values.iter().copied().fold(initial, f64::max);
        let trough = values.iter().copied().fold(f64::INFINITY, f64::min);
        prop_assert!(abs <= peak - trough + 1e-9);
    }

    #[test]
    fn sorted_rising_curve_has_no_drawdown(mut values in arb_equity()) {
        values.sort_by(|a, b| a.total_cmp(b));
        let (abs, _) = max_drawdown(&to_curve(&values), values[0]);
        prop_assert_eq!(abs, 0.0);
    }
}

// ── Whole runs ───────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn summary_ratios_stay_in_range(seed in any::<u64>(), n in 50usize..400) {
        let series = synthetic_series(n, seed).unwrap();
        let result = run_backtest_with(&BacktestConfig::default(), &series).unwrap();
        let s = &result.summary;
        prop_assert!((0.0..=1.0).contains(&s.win_rate));
        prop_assert!((0.0..=100.0).contains(&s.profit_factor));
        prop_assert!(s.wins + s.losses <= s.trade_count);
        prop_assert_eq!(s.win_rate, win_rate(&result.trades));
        prop_assert_eq!(s.profit_factor, profit_factor(&result.trades));
    }
}
