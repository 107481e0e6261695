//! PairLab CLI: run the pair pipeline from the command line.
//!
//! Commands:
//! - `run` — test a pair for cointegration, backtest the spread strategy,
//!   print the summary and optionally export the result table

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pairlab_core::data::{CircuitBreaker, CsvProvider, PriceProvider, SyntheticProvider, YahooProvider};
use pairlab_runner::{export_all, run_config, PairConfig, PipelineResult};

const DEFAULT_START: &str = "2018-01-01";

#[derive(Parser)]
#[command(
    name = "pairlab",
    about = "PairLab CLI — cointegration pairs-trading analysis"
)]
struct Cli {
    /// Log at info level unless RUST_LOG is set.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline for one pair and print the metrics summary.
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Dependent ticker (y). Optional with --config.
    #[arg(required_unless_present = "config", requires = "ticker2")]
    ticker1: Option<String>,

    /// Hedge ticker (x). Optional with --config.
    #[arg(required_unless_present = "config")]
    ticker2: Option<String>,

    /// Start date (YYYY-MM-DD). Defaults to 2018-01-01.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD), inclusive. Defaults to today.
    #[arg(long)]
    end: Option<String>,

    /// Analyse raw prices instead of log prices.
    #[arg(long, default_value_t = false)]
    no_log: bool,

    /// Rolling z-score window.
    #[arg(long)]
    window: Option<usize>,

    /// Entry threshold on |z|.
    #[arg(long)]
    entry: Option<f64>,

    /// Exit threshold on |z|.
    #[arg(long)]
    exit: Option<f64>,

    /// TOML config file; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read prices from {DIR}/{SYMBOL}.csv instead of Yahoo Finance.
    #[arg(long, conflicts_with = "synthetic")]
    csv_dir: Option<PathBuf>,

    /// Use deterministic synthetic prices (offline demo).
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Write results.csv, results.parquet, equity.csv and summary.json here.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Run(args) => run_cmd(args),
    };

    if let Err(e) = outcome {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_date(flag: &str, s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid --{flag} date '{s}' (expected YYYY-MM-DD)"))
}

fn run_cmd(args: RunArgs) -> Result<()> {
    let config = build_config(&args)?;
    let provider = build_provider(&args)?;

    let result = run_config(provider.as_ref(), &config)?;
    print_summary(&result);

    if let Some(dir) = &args.output {
        let paths = export_all(dir, &result)?;
        println!();
        println!("Results saved to: {}", paths.results_csv.display());
        println!("Parquet:          {}", paths.results_parquet.display());
        println!("Equity curve:     {}", paths.equity_csv.display());
        println!("Summary:          {}", paths.summary_json.display());
    }
    Ok(())
}

/// Config file (if any), then command-line overrides, then validation.
fn build_config(args: &RunArgs) -> Result<PairConfig> {
    let tickers = args.ticker1.as_deref().zip(args.ticker2.as_deref());
    let mut config = match (&args.config, tickers) {
        (Some(path), _) => PairConfig::from_file(path)?,
        (None, Some((t1, t2))) => {
            let start = parse_date("start", DEFAULT_START)?;
            let end = chrono::Local::now().date_naive();
            PairConfig::new(t1, t2, start, end, true)
        }
        (None, None) => bail!("two tickers are required without --config"),
    };

    if let Some((t1, t2)) = tickers {
        config.pair.ticker1 = t1.to_string();
        config.pair.ticker2 = t2.to_string();
    }
    if let Some(s) = &args.start {
        config.pair.start = parse_date("start", s)?;
    }
    if let Some(s) = &args.end {
        config.pair.end = parse_date("end", s)?;
    }
    if args.no_log {
        config.pair.use_log = false;
    }
    if let Some(w) = args.window {
        config.signal.window = w;
    }
    if let Some(e) = args.entry {
        config.signal.entry = e;
    }
    if let Some(e) = args.exit {
        config.signal.exit = e;
    }

    config.validate()?;
    Ok(config)
}

fn build_provider(args: &RunArgs) -> Result<Box<dyn PriceProvider>> {
    if args.synthetic {
        tracing::warn!("using synthetic prices; results are not real market data");
        return Ok(Box::new(SyntheticProvider::default()));
    }
    if let Some(dir) = &args.csv_dir {
        if !dir.is_dir() {
            bail!("--csv-dir {} is not a directory", dir.display());
        }
        return Ok(Box::new(CsvProvider::new(dir)));
    }
    let breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = YahooProvider::new(breaker).context("failed to set up Yahoo Finance client")?;
    Ok(Box::new(provider))
}

fn print_summary(result: &PipelineResult) {
    let c = &result.cointegration;
    println!("{}", result.summary);
    match c.statistic {
        Some(stat) => println!(
            "ADF stat:    {:.4} (lag {}, 5% critical {:.4})",
            stat, c.used_lag, c.critical_values.five_pct
        ),
        None => println!("ADF stat:    n/a (series are collinear)"),
    }
    println!("Source:      {}", result.provider);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<RunArgs, clap::Error> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Commands::Run(run) => Ok(run),
        }
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_without_tickers_is_a_usage_error() {
        let err = parse(&["pairlab", "run"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn run_with_one_ticker_is_a_usage_error() {
        let err = parse(&["pairlab", "run", "KO", "--synthetic"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn tickers_may_come_from_config() {
        let args = parse(&["pairlab", "run", "--config", "pair.toml"]).unwrap();
        assert!(args.ticker1.is_none());
        assert_eq!(args.config, Some(PathBuf::from("pair.toml")));
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "pairlab", "run", "ko", "pep", "--start", "2020-01-01", "--end", "2020-06-30",
            "--window", "30", "--no-log",
        ])
        .unwrap();
        let config = build_config(&args).unwrap();
        assert_eq!(config.pair.ticker1, "ko");
        assert_eq!(config.signal.window, 30);
        assert!(!config.pair.use_log);
        assert_eq!(config.pair.end, NaiveDate::from_ymd_opt(2020, 6, 30).unwrap());
    }
}
