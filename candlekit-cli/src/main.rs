//! candlekit CLI: run a backtest and print the result as JSON.
//!
//! Commands:
//! - `run`: execute a backtest from a TOML config over a CSV file or a
//!   seeded synthetic series

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use candlekit_runner::{load_csv, run_backtest_with, synthetic_series, BacktestConfig};

#[derive(Parser)]
#[command(name = "candlekit", about = "candlekit: candle-pattern backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// CSV file with timestamp,open,high,low,close[,volume] rows.
        #[arg(long, conflicts_with = "synthetic")]
        data: Option<PathBuf>,

        /// Generate this many synthetic hourly bars instead of reading a file.
        #[arg(long)]
        synthetic: Option<usize>,

        /// Seed for --synthetic.
        #[arg(long, default_value_t = 42, requires = "synthetic")]
        seed: u64,

        /// Print only the summary statistics.
        #[arg(long, default_value_t = false)]
        summary_only: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data,
            synthetic,
            seed,
            summary_only,
        } => run_backtest_cmd(config, data, synthetic, seed, summary_only),
    }
}

fn run_backtest_cmd(
    config_path: PathBuf,
    data: Option<PathBuf>,
    synthetic: Option<usize>,
    seed: u64,
    summary_only: bool,
) -> Result<()> {
    let config = BacktestConfig::from_file(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let series = match (data, synthetic) {
        (Some(path), None) => {
            load_csv(&path).with_context(|| format!("loading {}", path.display()))?
        }
        (None, Some(n)) => synthetic_series(n, seed)?,
        _ => bail!("exactly one of --data or --synthetic is required"),
    };
    info!(bars = series.len(), run_id = %config.run_id(), "series ready");

    let result = run_backtest_with(&config, &series)?;

    let json = if summary_only {
        serde_json::to_string_pretty(&result.summary)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{json}");

    if let Some(reason) = &result.abort_reason {
        eprintln!("run aborted early: {reason}");
    }
    Ok(())
}
