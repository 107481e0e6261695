//! Stage-level behaviour of the hedge, spread, z-score and signal functions.

use chrono::NaiveDate;
use pairlab_core::backtest::backtest;
use pairlab_core::domain::{Position, PositionSeries, PriceSeries, Spread, ZScoreSeries};
use pairlab_core::signals::{build_spread, signals, zscore};
use pairlab_core::stats::{cointegration_pvalue, estimate_hedge_ratio};
use pairlab_core::AnalysisError;

fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
    (0..n)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

fn prices(values: Vec<f64>) -> PriceSeries {
    PriceSeries::new(dates(values.len()), values).unwrap()
}

#[test]
fn carry_forward_example() {
    let z = ZScoreSeries::new(
        dates(7),
        [3.0, 1.0, 1.0, -3.0, 0.3, 0.3, 1.5].map(Some).to_vec(),
    )
    .unwrap();
    let got: Vec<i8> = signals(&z)
        .values()
        .iter()
        .map(|p| p.map(Position::as_i8).unwrap())
        .collect();
    assert_eq!(got, vec![-1, -1, -1, 1, 0, 0, 0]);
}

#[test]
fn hedge_ratio_recovers_injected_beta() {
    let x: Vec<f64> = (0..200).map(|i| 50.0 + (i as f64 * 0.1).sin() * 5.0 + i as f64 * 0.05).collect();
    let y: Vec<f64> = x
        .iter()
        .enumerate()
        .map(|(i, v)| 3.0 * v + 1e-3 * ((i * 37 % 11) as f64 - 5.0))
        .collect();
    let beta = estimate_hedge_ratio(&prices(y), &prices(x)).unwrap();
    assert!((beta - 3.0).abs() < 0.05, "beta = {beta}");
}

#[test]
fn constant_independent_series_is_degenerate() {
    let y = prices(vec![1.0, 2.0, 3.0, 4.0]);
    let x = prices(vec![7.0; 4]);
    let err = estimate_hedge_ratio(&y, &x).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::DegenerateStatistic { statistic: "hedge ratio", .. }
    ));
}

#[test]
fn constant_spread_is_degenerate() {
    let spread = Spread::new(dates(80), vec![0.25; 80]).unwrap();
    let err = zscore(&spread, 60).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::DegenerateStatistic { statistic: "z-score", .. }
    ));
}

#[test]
fn constant_pnl_is_degenerate() {
    let spread = Spread::new(dates(10), (0..10).map(|i| i as f64 * 0.5).collect()).unwrap();
    let positions = PositionSeries::new(dates(10), vec![Some(Position::Short); 10]).unwrap();
    let err = backtest(&spread, &positions).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::DegenerateStatistic { statistic: "sharpe ratio", .. }
    ));
}

#[test]
fn spread_of_exact_hedge_is_intercept() {
    let x = prices((1..=30).map(f64::from).collect());
    let y = prices(x.values().iter().map(|v| 4.0 + 2.0 * v).collect());
    let spread = build_spread(&y, &x, 2.0).unwrap();
    assert!(spread.values().iter().all(|s| (s - 4.0).abs() < 1e-12));
}

#[test]
fn cointegration_pvalue_is_a_probability() {
    let x = prices((0..150).map(|i| 10.0 + (i as f64 * 0.21).sin() + i as f64 * 0.01).collect());
    let y = prices(
        x.values()
            .iter()
            .enumerate()
            .map(|(i, v)| 2.0 * v + 0.05 * (i as f64 * 1.3).cos())
            .collect(),
    );
    let p = cointegration_pvalue(&y, &x).unwrap();
    assert!((0.0..=1.0).contains(&p), "p = {p}");
}
