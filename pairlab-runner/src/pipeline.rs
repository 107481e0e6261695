//! Pair pipeline: wires loading, statistics, signals and backtest together.
//!
//! Two entry points:
//! - `run_pair()`: tickers, dates and log flag with default signal settings.
//! - `run_config()`: a full [`PairConfig`].
//!
//! `run_cached()` wraps `run_config()` in a [`ResultCache`].

use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

use pairlab_core::backtest::backtest_with;
use pairlab_core::data::{align_pair, DataError, PriceProvider};
use pairlab_core::signals::{pair_spread, signals_with, zscore};
use pairlab_core::stats::ols::MIN_HEDGE_OBSERVATIONS;
use pairlab_core::stats::{engle_granger, estimate_hedge_ratio};
use pairlab_core::AnalysisError;

use crate::cache::ResultCache;
use crate::config::{ConfigError, PairConfig};
use crate::data_loader::load_pair;
use crate::result::{MetricsSummary, PipelineResult, ResultRow, SCHEMA_VERSION};

/// Errors from the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("data unavailable: {0}")]
    DataUnavailable(String),
    #[error("invalid date range {start} to {end}: {reason}")]
    InvalidDateRange {
        start: NaiveDate,
        end: NaiveDate,
        reason: String,
    },
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Run the pipeline for one pair with default signal and backtest settings.
pub fn run_pair(
    provider: &dyn PriceProvider,
    ticker1: &str,
    ticker2: &str,
    start: NaiveDate,
    end: NaiveDate,
    use_log: bool,
) -> Result<PipelineResult, PipelineError> {
    run_config(provider, &PairConfig::new(ticker1, ticker2, start, end, use_log))
}

/// Run the pipeline for a full configuration.
pub fn run_config(
    provider: &dyn PriceProvider,
    config: &PairConfig,
) -> Result<PipelineResult, PipelineError> {
    let config = config.normalized();
    let pair = &config.pair;
    let (start, end) = (pair.start, pair.end);
    let (t1, t2) = (pair.ticker1.as_str(), pair.ticker2.as_str());

    if end < start {
        return Err(PipelineError::InvalidDateRange {
            start,
            end,
            reason: "end is before start".into(),
        });
    }
    if t1.is_empty() || t2.is_empty() {
        return Err(PipelineError::DataUnavailable("empty ticker symbol".into()));
    }
    config.validate()?;

    tracing::info!(pair = %format!("{t1}/{t2}"), %start, %end, use_log = pair.use_log, "running pair pipeline");

    let loaded = load_pair(provider, t1, t2, start, end)?;
    let raw = align_pair(&loaded.prices1, &loaded.prices2)?;
    if raw.len() < MIN_HEDGE_OBSERVATIONS {
        return Err(AnalysisError::InsufficientAlignment {
            observations: raw.len(),
            required: MIN_HEDGE_OBSERVATIONS,
        }
        .into());
    }
    tracing::debug!(rows = raw.len(), "aligned prices");

    let used = if pair.use_log { raw.ln()? } else { raw.clone() };

    let cointegration = engle_granger(used.left().values(), used.right().values())?;
    tracing::debug!(
        statistic = ?cointegration.statistic,
        p_value = cointegration.p_value,
        used_lag = cointegration.used_lag,
        "cointegration test"
    );

    let beta = estimate_hedge_ratio(used.left(), used.right())?;
    tracing::debug!(beta, "hedge ratio");

    let spread = pair_spread(&used, beta)?;
    let z = zscore(&spread, config.signal.window)?;
    let positions = signals_with(&z, &config.signal.thresholds());
    tracing::debug!(
        scored = z.values().iter().filter(|v| v.is_some()).count(),
        "signals generated"
    );

    // A row needs a defined z-score, position and equity; equity needs a
    // position held going into the period.
    let held = positions.values().iter().rev().skip(1).filter(|p| p.is_some()).count();
    if held == 0 {
        return Err(PipelineError::InvalidDateRange {
            start,
            end,
            reason: format!(
                "no rows remain after the {}-point z-score warmup and one-period lag ({} aligned rows)",
                config.signal.window,
                raw.len()
            ),
        });
    }

    let outcome = backtest_with(&spread, &positions, config.backtest.periods_per_year)?;

    let rows: Vec<ResultRow> = (0..raw.len())
        .filter_map(|i| {
            Some(ResultRow {
                date: raw.dates()[i],
                price1: raw.left().values()[i],
                price2: raw.right().values()[i],
                used1: used.left().values()[i],
                used2: used.right().values()[i],
                spread: spread.values()[i],
                z_score: z.values()[i]?,
                position: positions.values()[i]?,
                equity: outcome.equity.values()[i]?,
            })
        })
        .collect();

    // Rows are contiguous from the first held period, so the range is the
    // first and last row.
    let (first, last) = match (rows.first(), rows.last()) {
        (Some(f), Some(l)) => (f.date, l.date),
        _ => {
            return Err(PipelineError::InvalidDateRange {
                start,
                end,
                reason: "no complete rows".into(),
            })
        }
    };

    let summary = MetricsSummary {
        ticker1: t1.to_string(),
        ticker2: t2.to_string(),
        rows: rows.len(),
        start: first,
        end: last,
        p_value: cointegration.p_value,
        adf_statistic: cointegration.statistic,
        beta,
        sharpe: outcome.sharpe,
    };

    tracing::info!(
        pair = %summary.label(),
        rows = summary.rows,
        beta,
        p_value = cointegration.p_value,
        sharpe = outcome.sharpe,
        "pair pipeline finished"
    );

    Ok(PipelineResult {
        schema_version: SCHEMA_VERSION,
        cache_key: config.cache_key(),
        dataset_hash: loaded.dataset_hash,
        provider: loaded.provider,
        config,
        cointegration,
        summary,
        rows,
    })
}

/// Run through `cache`, computing only on a miss. Failures are not cached.
pub fn run_cached(
    cache: &ResultCache<PipelineResult>,
    provider: &dyn PriceProvider,
    config: &PairConfig,
) -> Result<Arc<PipelineResult>, PipelineError> {
    cache.get_or_compute(&config.cache_key(), || run_config(provider, config))
}
