//! End-to-end pipeline tests on deterministic in-memory prices.

use chrono::{Datelike, NaiveDate, Weekday};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pairlab_core::data::{DataError, FetchResult, InMemoryProvider, PriceProvider};
use pairlab_core::domain::{Position, PriceSeries};
use pairlab_core::AnalysisError;
use pairlab_runner::export::{export_json, export_summary_json, import_json, SummaryDocument};
use pairlab_runner::{
    run_cached, run_config, run_pair, ManualClock, PairConfig, PipelineError, ResultCache,
};

const N: usize = 120;
const BETA: f64 = 1.5;
const SPIKE_AT: usize = 59;

fn weekdays(n: usize) -> Vec<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .iter_days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(n)
        .collect()
}

/// Deterministic pseudo-random values in [-0.5, 0.5).
fn shocks(n: usize) -> Vec<f64> {
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
        })
        .collect()
}

/// Log prices with `y = 0.5 + 1.5 x + noise`, and a spread spike at the end
/// of the first full z-score window so the first signal fires there.
fn log_prices(n: usize) -> (Vec<f64>, Vec<f64>) {
    let noise = shocks(n);
    let x: Vec<f64> = (0..n)
        .map(|i| 4.0 + 0.3 * (i as f64 * 0.05).sin() + 0.002 * i as f64)
        .collect();
    let y = x
        .iter()
        .enumerate()
        .map(|(i, xi)| {
            let spike = if i == SPIKE_AT { 0.1 } else { 0.0 };
            0.5 + BETA * xi + 0.01 * noise[i] + spike
        })
        .collect();
    (y, x)
}

fn provider(n: usize) -> InMemoryProvider {
    let dates = weekdays(n);
    let (y, x) = log_prices(n);
    let exp = |v: Vec<f64>| v.into_iter().map(f64::exp).collect::<Vec<_>>();
    InMemoryProvider::new()
        .with_series("AAA", PriceSeries::new(dates.clone(), exp(y)).unwrap())
        .with_series("BBB", PriceSeries::new(dates, exp(x)).unwrap())
}

fn range() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    )
}

#[test]
fn end_to_end_yields_sixty_rows() {
    let (start, end) = range();
    let result = run_pair(&provider(N), "AAA", "BBB", start, end, true).unwrap();

    // 120 points - 59 warmup - 1 lag
    assert_eq!(result.rows.len(), 60);
    assert_eq!(result.summary.rows, 60);
    assert_eq!(result.summary.start, weekdays(N)[60]);
    assert_eq!(result.summary.end, weekdays(N)[N - 1]);

    assert!((result.summary.beta - BETA).abs() < 0.05, "beta = {}", result.summary.beta);
    assert!(result.summary.sharpe.is_finite());
    assert!((0.0..=1.0).contains(&result.summary.p_value));

    let df = result.to_dataframe().unwrap();
    assert_eq!(df.height(), 60);
    assert_eq!(df.width(), 9);
    assert_eq!(result.equity_curve().len(), 60);
}

#[test]
fn used_prices_are_logs_of_raw_prices() {
    let (start, end) = range();
    let result = run_pair(&provider(N), "AAA", "BBB", start, end, true).unwrap();
    for row in &result.rows {
        assert!((row.used1 - row.price1.ln()).abs() < 1e-12);
        assert!((row.used2 - row.price2.ln()).abs() < 1e-12);
    }
}

#[test]
fn equity_steps_by_lagged_position() {
    let (start, end) = range();
    let result = run_pair(&provider(N), "AAA", "BBB", start, end, true).unwrap();
    for w in result.rows.windows(2) {
        let step = w[1].equity - w[0].equity;
        let expected = w[0].position.as_f64() * (w[1].spread - w[0].spread);
        assert!((step - expected).abs() < 1e-12);
    }
}

#[test]
fn spike_opens_a_short() {
    let (start, end) = range();
    let result = run_pair(&provider(N), "AAA", "BBB", start, end, true).unwrap();
    // The spike reverts on the next day, so the short held into the first
    // row books a gain.
    assert!(result.rows[0].equity > 0.0);
    assert_ne!(result.rows[0].position, Position::Long);
}

#[test]
fn tickers_are_normalized() {
    let (start, end) = range();
    let result = run_pair(&provider(N), " aaa", "bbb ", start, end, true).unwrap();
    assert_eq!(result.summary.label(), "AAA/BBB");
    assert_eq!(result.config.pair.ticker1, "AAA");
    assert!(result.to_dataframe().unwrap().column("AAA_price").is_ok());
}

#[test]
fn end_date_truncates_rows() {
    let (start, _) = range();
    let end = weekdays(N)[109];
    let result = run_pair(&provider(N), "AAA", "BBB", start, end, true).unwrap();
    assert_eq!(result.rows.len(), 50);
    assert_eq!(result.summary.end, end);
}

#[test]
fn empty_provider_is_data_unavailable() {
    let (start, end) = range();
    let err = run_pair(&InMemoryProvider::new(), "AAA", "BBB", start, end, true).unwrap_err();
    assert!(matches!(err, PipelineError::DataUnavailable(_)));
}

#[test]
fn missing_ticker_is_data_unavailable() {
    let (start, end) = range();
    let err = run_pair(&provider(N), "AAA", "ZZZ", start, end, true).unwrap_err();
    match err {
        PipelineError::DataUnavailable(msg) => assert!(msg.contains("ZZZ"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn inverted_range_is_invalid() {
    let (start, end) = range();
    let err = run_pair(&provider(N), "AAA", "BBB", end, start, true).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidDateRange { .. }));
}

#[test]
fn no_surviving_rows_is_invalid_range() {
    // Only the first window: the spike fires on the last point, so nothing
    // is held into a later period.
    let (start, end) = range();
    let err = run_pair(&provider(SPIKE_AT + 1), "AAA", "BBB", start, end, true).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidDateRange { .. }), "{err}");
}

#[test]
fn non_positive_price_under_log_is_degenerate() {
    let dates = weekdays(5);
    let provider = InMemoryProvider::new()
        .with_series("AAA", PriceSeries::new(dates.clone(), vec![1.0, 2.0, 0.0, 3.0, 4.0]).unwrap())
        .with_series("BBB", PriceSeries::new(dates, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap());
    let (start, end) = range();
    let err = run_pair(&provider, "AAA", "BBB", start, end, true).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Analysis(AnalysisError::DegenerateStatistic { .. })
    ));
}

#[test]
fn custom_window_changes_row_count() {
    let (start, end) = range();
    let mut config = PairConfig::new("AAA", "BBB", start, end, true);
    config.signal.window = 30;
    // The first signal fires somewhere after the 30-point warmup.
    let result = run_config(&provider(N), &config).unwrap();
    assert!(result.rows.len() <= N - 30);
    assert!(result.rows.len() >= 60);
}

/// Counts fetches, delegating to an in-memory provider.
struct CountingProvider {
    inner: InMemoryProvider,
    fetches: AtomicUsize,
}

impl PriceProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<FetchResult, DataError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(symbol, start, end)
    }
}

#[test]
fn cached_runs_fetch_once() {
    let provider = CountingProvider {
        inner: provider(N),
        fetches: AtomicUsize::new(0),
    };
    let cache = ResultCache::new(Arc::new(ManualClock::new()));
    let (start, end) = range();
    let config = PairConfig::new("AAA", "BBB", start, end, true);

    let a = run_cached(&cache, &provider, &config).unwrap();
    let b = run_cached(&cache, &provider, &PairConfig::new("aaa", " bbb", start, end, true)).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_runs_are_not_cached() {
    let cache = ResultCache::default();
    let (start, end) = range();
    let config = PairConfig::new("AAA", "BBB", start, end, true);

    assert!(run_cached(&cache, &InMemoryProvider::new(), &config).is_err());
    assert!(cache.is_empty());
    assert!(run_cached(&cache, &provider(N), &config).is_ok());
    assert_eq!(cache.len(), 1);
}

/// Legs that are linear in each other up to tiny noise and one small kink,
/// so the first-stage fit is collinear but the signal still fires.
fn collinear_provider(n: usize) -> InMemoryProvider {
    let dates = weekdays(n);
    let noise = shocks(n);
    let (_, x) = log_prices(n);
    let y: Vec<f64> = x
        .iter()
        .enumerate()
        .map(|(i, xi)| {
            let kink = if i == SPIKE_AT { 0.001 } else { 0.0 };
            0.2 + 1.3 * xi + 1e-5 * noise[i] + kink
        })
        .collect();
    let exp = |v: Vec<f64>| v.into_iter().map(f64::exp).collect::<Vec<_>>();
    InMemoryProvider::new()
        .with_series("AAA", PriceSeries::new(dates.clone(), exp(y)).unwrap())
        .with_series("BBB", PriceSeries::new(dates, exp(x)).unwrap())
}

#[test]
fn collinear_run_exports_and_reimports() {
    let (start, end) = range();
    let result = run_pair(&collinear_provider(N), "AAA", "BBB", start, end, true).unwrap();
    assert!(result.cointegration.is_collinear());
    assert_eq!(result.summary.adf_statistic, None);
    assert_eq!(result.summary.p_value, 0.0);

    let back = import_json(&export_json(&result).unwrap()).unwrap();
    assert_eq!(back.cointegration.statistic, None);
    assert_eq!(back.rows.len(), result.rows.len());

    let doc: SummaryDocument =
        serde_json::from_str(&export_summary_json(&result).unwrap()).unwrap();
    assert_eq!(doc.summary.adf_statistic, None);
}
