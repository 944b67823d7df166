//! Engine integration tests through the public API.

use candlekit_core::domain::{Bar, BarSeries, BarView, ExitReason, Side, Signal};
use candlekit_core::engine::{run_backtest, EngineConfig, EngineError, EnginePhase};
use candlekit_core::risk::RiskParams;
use candlekit_core::strategies::{
    create_strategy, IctParams, SmcParams, Strategy, StrategyConfig, StrategyError,
    StructureParams,
};
use chrono::{Duration, TimeZone, Utc};

fn make_test_bars(n: usize) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    let mut price = 50.0;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            let noise = ((seed >> 33) % 100) as f64 / 50.0 - 1.0;
            let wave = (i as f64 * 0.3).sin();
            let open = price;
            price = (price + noise + wave).max(5.0);
            let close = price;
            let wick = 0.2 + ((seed >> 50) % 10) as f64 / 10.0;
            Bar::new(
                base + Duration::days(i as i64),
                open,
                open.max(close) + wick,
                open.min(close) - wick,
                close,
            )
        })
        .collect()
}

fn engine_config() -> EngineConfig {
    EngineConfig {
        fee_rate: 0.0005,
        ..EngineConfig::new(10_000.0, RiskParams::default())
    }
}

fn active_configs() -> Vec<StrategyConfig> {
    vec![
        StrategyConfig::Smc(SmcParams {
            swing_strength: 2,
            ..SmcParams::default()
        }),
        StrategyConfig::from_name("crt").unwrap(),
        StrategyConfig::Ict(IctParams {
            swing_strength: 2,
            ..IctParams::default()
        }),
        StrategyConfig::MarketStructure(StructureParams {
            swing_strength: 2,
            ..StructureParams::default()
        }),
    ]
}

/// Goes long on the first bar and never asks to leave.
struct BuyAndHold;

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn on_bar(&mut self, bars: &BarView<'_>) -> Result<Vec<Signal>, StrategyError> {
        if bars.len() == 1 {
            let close = bars[0].close;
            return Ok(vec![Signal::entry(Side::Long, close, "first_bar")]);
        }
        Ok(Vec::new())
    }
}

/// Alternates long entries and exits every `every` bars, then fails at `fail_at`.
struct Flaky {
    every: usize,
    fail_at: usize,
}

impl Strategy for Flaky {
    fn name(&self) -> &str {
        "flaky"
    }

    fn on_bar(&mut self, bars: &BarView<'_>) -> Result<Vec<Signal>, StrategyError> {
        let i = bars.len() - 1;
        if i == self.fail_at {
            return Err(StrategyError::Logic(format!("cannot evaluate bar {i}")));
        }
        let close = bars[i].close;
        match (i / self.every) % 2 {
            0 if i % self.every == 0 => Ok(vec![Signal::entry(Side::Long, close, "tick")]),
            1 if i % self.every == 0 => Ok(vec![Signal::exit(Side::Long, close, "tock")]),
            _ => Ok(Vec::new()),
        }
    }
}

#[test]
fn runs_are_deterministic() {
    let series = BarSeries::new(make_test_bars(400)).unwrap();
    for config in active_configs() {
        let first = run_backtest(&series, &mut *create_strategy(&config).unwrap(), &engine_config())
            .unwrap();
        let second = run_backtest(&series, &mut *create_strategy(&config).unwrap(), &engine_config())
            .unwrap();
        assert_eq!(first, second, "{} is not deterministic", config.name());
    }
}

#[test]
fn at_most_one_position_at_a_time() {
    let series = BarSeries::new(make_test_bars(400)).unwrap();
    for config in active_configs() {
        let result = run_backtest(&series, &mut *create_strategy(&config).unwrap(), &engine_config())
            .unwrap();
        for pair in result.trades.windows(2) {
            assert!(
                pair[1].entry_index >= pair[0].exit_index,
                "{}: trade opened at {} before previous closed at {}",
                config.name(),
                pair[1].entry_index,
                pair[0].exit_index
            );
        }
        for trade in &result.trades {
            assert!(trade.exit_index >= trade.entry_index);
            assert_eq!(trade.bars_held, trade.exit_index - trade.entry_index);
        }
    }
}

#[test]
fn balance_reconciles_with_trades() {
    let series = BarSeries::new(make_test_bars(400)).unwrap();
    for config in active_configs() {
        let result = run_backtest(&series, &mut *create_strategy(&config).unwrap(), &engine_config())
            .unwrap();
        let booked: f64 = result.trades.iter().map(|t| t.pnl).sum();
        assert!(
            (result.final_balance - (10_000.0 + booked)).abs() < 1e-6,
            "{}: balance {} vs booked {}",
            config.name(),
            result.final_balance,
            booked
        );
        assert_eq!(result.equity_curve.len(), series.len());
        assert_eq!(result.bar_count, series.len());
        let last = result.equity_curve.last().unwrap();
        assert!((last.equity - result.final_balance).abs() < 1e-6);
    }
}

#[test]
fn end_of_data_closes_at_last_close() {
    let bars = make_test_bars(50);
    let last_close = bars[49].close;
    let series = BarSeries::new(bars).unwrap();
    // Stops and targets far away so only the end of data can close.
    let config = EngineConfig::new(
        10_000.0,
        RiskParams {
            risk_pct: 1.0,
            sl_pct: 90.0,
            tp_pct: 1000.0,
        },
    );
    let result = run_backtest(&series, &mut BuyAndHold, &config).unwrap();
    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::EndOfData);
    assert_eq!(trade.exit_price, last_close);
    assert_eq!(trade.exit_index, 49);
    assert_eq!(trade.entry_index, 0);
}

#[test]
fn abort_preserves_earlier_trades() {
    let series = BarSeries::new(make_test_bars(100)).unwrap();
    let config = EngineConfig::new(
        10_000.0,
        RiskParams {
            risk_pct: 1.0,
            sl_pct: 50.0,
            tp_pct: 500.0,
        },
    );
    let mut strategy = Flaky {
        every: 5,
        fail_at: 42,
    };
    let err = run_backtest(&series, &mut strategy, &config).unwrap_err();
    let partial = err.partial().expect("partial results");
    assert_eq!(partial.phase, EnginePhase::Aborted);
    assert_eq!(partial.equity_curve.len(), 42);
    assert!(!partial.trades.is_empty());
    assert!(partial.trades.iter().all(|t| t.exit_reason == ExitReason::SignalExit));
    assert!(partial.trades.iter().all(|t| t.exit_index < 42));

    match err {
        EngineError::StrategyFailure(aborted) => {
            assert_eq!(aborted.bar_index, 42);
            assert!(matches!(aborted.cause, StrategyError::Logic(_)));
        }
        other => panic!("expected strategy failure, got {other:?}"),
    }
}

#[test]
fn run_result_serializes_to_json() {
    let series = BarSeries::new(make_test_bars(30)).unwrap();
    let result = run_backtest(&series, &mut BuyAndHold, &EngineConfig::default()).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["strategy"], "buy_and_hold");
    assert_eq!(json["phase"], "finished");
    assert_eq!(json["trades"][0]["exit_reason"], "end_of_data");
    assert_eq!(json["equity_curve"].as_array().unwrap().len(), 30);
}
