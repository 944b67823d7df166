//! Look-ahead contamination tests for every strategy family and the engine.
//!
//! Invariant: strategy output at bar t may not depend on bars t+1 or later.
//!
//! Method: drive a fresh strategy over the truncated series (bars 0..120) and
//! another over the full series (bars 0..300). Outputs for bars 0..120 must be
//! identical. Any difference means a detector is reading future bars.

use candlekit_core::domain::{Bar, BarSeries, Signal};
use candlekit_core::engine::{run_backtest, EngineConfig};
use candlekit_core::risk::RiskParams;
use candlekit_core::strategies::{
    create_strategy, CrtParams, IctParams, SmcParams, StrategyConfig, StructureParams,
};
use chrono::{Duration, TimeZone, Utc};

const FULL_LEN: usize = 300;
const TRUNCATED_LEN: usize = 120;

/// Deterministic zig-zag random walk with realistic wicks.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let mut price = 100.0;
    (0..n)
        .map(|i| {
            let seed = (i as u64)
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let noise = ((seed >> 33) % 200) as f64 / 100.0 - 1.0;
            let wave = (i as f64 * 0.25).sin() * 1.2;
            let open = price;
            price = (price + noise + wave).max(10.0);
            let close = price;
            let wick = 0.3 + ((seed >> 45) % 100) as f64 / 80.0;
            Bar::new(
                base + Duration::hours(i as i64),
                open,
                open.max(close) + wick,
                open.min(close) - wick,
                close,
            )
        })
        .collect()
}

fn configs() -> Vec<StrategyConfig> {
    vec![
        StrategyConfig::Smc(SmcParams {
            swing_strength: 2,
            body_lookback: 5,
            window: 60,
            ..SmcParams::default()
        }),
        StrategyConfig::Crt(CrtParams {
            range_lookback: 5,
            window: 30,
            ..CrtParams::default()
        }),
        StrategyConfig::Ict(IctParams {
            swing_strength: 2,
            window: 80,
            ..IctParams::default()
        }),
        StrategyConfig::MarketStructure(StructureParams {
            swing_strength: 2,
            window: 80,
            ..StructureParams::default()
        }),
        StrategyConfig::Null,
    ]
}

fn drive(config: &StrategyConfig, series: &BarSeries) -> Vec<Vec<Signal>> {
    let mut strategy = create_strategy(config).unwrap();
    series
        .prefixes()
        .map(|prefix| strategy.on_bar(&prefix).unwrap())
        .collect()
}

#[test]
fn strategies_have_no_lookahead() {
    let bars = make_test_bars(FULL_LEN);
    let full = BarSeries::new(bars.clone()).unwrap();
    let truncated = BarSeries::new(bars[..TRUNCATED_LEN].to_vec()).unwrap();

    for config in configs() {
        let full_out = drive(&config, &full);
        let truncated_out = drive(&config, &truncated);
        assert_eq!(truncated_out.len(), TRUNCATED_LEN);
        for i in 0..TRUNCATED_LEN {
            assert_eq!(
                truncated_out[i],
                full_out[i],
                "{}: output differs at bar {i}",
                config.name()
            );
        }
    }
}

#[test]
fn strategies_emit_signals_on_test_data() {
    let series = BarSeries::new(make_test_bars(FULL_LEN)).unwrap();
    let total: usize = configs()
        .iter()
        .map(|config| drive(config, &series).iter().map(Vec::len).sum::<usize>())
        .sum();
    assert!(total > 0, "no strategy produced a single signal");
}

#[test]
fn engine_has_no_lookahead() {
    let bars = make_test_bars(FULL_LEN);
    let full = BarSeries::new(bars.clone()).unwrap();
    let truncated = BarSeries::new(bars[..TRUNCATED_LEN].to_vec()).unwrap();
    let engine = EngineConfig::new(10_000.0, RiskParams::default());

    for config in configs() {
        let full_run = run_backtest(&full, &mut *create_strategy(&config).unwrap(), &engine).unwrap();
        let truncated_run =
            run_backtest(&truncated, &mut *create_strategy(&config).unwrap(), &engine).unwrap();

        // Without fees, the forced close at the truncation point books the
        // same equity the open position was marked at.
        assert_eq!(
            truncated_run.equity_curve[..],
            full_run.equity_curve[..TRUNCATED_LEN],
            "{}: equity curves diverge",
            config.name()
        );

        let settled: Vec<_> = truncated_run
            .trades
            .iter()
            .filter(|t| t.exit_index < TRUNCATED_LEN - 1)
            .collect();
        for (a, b) in settled.iter().zip(&full_run.trades) {
            assert_eq!(*a, b, "{}: trades diverge", config.name());
        }
    }
}
