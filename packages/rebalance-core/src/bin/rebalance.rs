//! Rebalance CLI - Command line interface for fixed-weight portfolio backtests.
//!
//! This binary prints JSON envelopes on stdout for integration with a
//! dashboard front end. Logs go to stderr.

use clap::{Parser, Subcommand};
use rebalance_core::{
    backtest::load_price_table, run_backtest, ApiResponse, BacktestConfig, RebalancePeriod,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "rebalance")]
#[command(about = "Backtest a fixed-weight, periodically rebalanced portfolio")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest over a JSON price file
    Run {
        /// Price table: a JSON array of {"date", "prices"} rows
        #[arg(short, long)]
        prices: PathBuf,
        /// Config file (defaults to the user config path)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the rebalance frequency (N, M, Q, A)
        #[arg(short, long)]
        rebalance: Option<RebalancePeriod>,
        /// Override the starting capital
        #[arg(short, long)]
        initial: Option<f64>,
        /// Price table containing the benchmark ticker
        #[arg(long)]
        benchmark_prices: Option<PathBuf>,
        /// Override the benchmark ticker
        #[arg(short, long)]
        benchmark: Option<String>,
    },
    /// Show the effective configuration
    Config {
        /// Config file (defaults to the user config path)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            prices,
            config,
            rebalance,
            initial,
            benchmark_prices,
            benchmark,
        } => handle_run(
            &prices,
            config.as_deref(),
            rebalance,
            initial,
            benchmark_prices.as_deref(),
            benchmark,
        ),
        Commands::Config { config } => handle_config(config.as_deref()),
    };

    let output = match result {
        Ok(data) => serde_json::to_string_pretty(&ApiResponse::ok(data))?,
        Err(e) => {
            tracing::error!("{}", e);
            serde_json::to_string_pretty(&ApiResponse::<()>::err(e.to_string()))?
        }
    };

    println!("{}", output);
    Ok(())
}

fn load_config(path: Option<&Path>) -> rebalance_core::Result<(PathBuf, BacktestConfig)> {
    match path {
        Some(path) => Ok((path.to_path_buf(), BacktestConfig::load_from_path(path)?)),
        None => Ok((BacktestConfig::default_path(), BacktestConfig::load()?)),
    }
}

fn handle_run(
    prices: &Path,
    config: Option<&Path>,
    rebalance: Option<RebalancePeriod>,
    initial: Option<f64>,
    benchmark_prices: Option<&Path>,
    benchmark: Option<String>,
) -> rebalance_core::Result<Value> {
    let (_, mut config) = load_config(config)?;
    if let Some(period) = rebalance {
        config.rebalance = period;
    }
    if let Some(cash) = initial {
        config.initial_cash = cash;
    }
    if benchmark.is_some() {
        config.benchmark = benchmark;
    }

    let table = load_price_table(prices)?;
    let benchmark_table = benchmark_prices.map(load_price_table).transpose()?;

    let report = run_backtest(&config, &table, benchmark_table.as_ref())?;
    Ok(serde_json::to_value(report)?)
}

fn handle_config(config: Option<&Path>) -> rebalance_core::Result<Value> {
    let (path, config) = load_config(config)?;
    config.validate()?;

    Ok(json!({
        "path": path,
        "exists": path.exists(),
        "rebalance_label": config.rebalance.label(),
        "config": config,
    }))
}
