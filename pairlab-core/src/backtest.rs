//! Lagged-position backtest of the spread.
//!
//! P&L at `t` is earned by the position held going into `t`:
//! `pnl[t] = pos[t-1] * (s[t] - s[t-1])`. `pnl[0]` never exists, and neither
//! does pnl for a period that starts with no position.

use serde::{Deserialize, Serialize};

use crate::domain::series::{is_near_zero, mean, sample_std};
use crate::domain::{PositionSeries, Spread, TimeSeries};
use crate::error::AnalysisError;

/// Trading periods per year used to annualize the Sharpe ratio.
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

/// Per-period P&L; `None` where no position was held going in.
pub type PnlSeries = TimeSeries<Option<f64>>;

/// Running sum of defined P&L, `None` where P&L is undefined.
pub type EquityCurve = TimeSeries<Option<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcome {
    pub pnl: PnlSeries,
    pub equity: EquityCurve,
    pub sharpe: f64,
}

impl BacktestOutcome {
    /// Equity at the last defined point.
    pub fn final_equity(&self) -> Option<f64> {
        self.equity.values().iter().rev().find_map(|v| *v)
    }

    /// Defined P&L values in date order.
    pub fn realized_pnl(&self) -> Vec<f64> {
        self.pnl.values().iter().filter_map(|v| *v).collect()
    }
}

/// Backtest with 252 periods per year.
pub fn backtest(spread: &Spread, positions: &PositionSeries) -> Result<BacktestOutcome, AnalysisError> {
    backtest_with(spread, positions, DEFAULT_PERIODS_PER_YEAR)
}

pub fn backtest_with(
    spread: &Spread,
    positions: &PositionSeries,
    periods_per_year: f64,
) -> Result<BacktestOutcome, AnalysisError> {
    if spread.len() != positions.len() {
        return Err(AnalysisError::LengthMismatch {
            left: spread.len(),
            right: positions.len(),
        });
    }
    if !spread.same_index(positions) {
        return Err(AnalysisError::InvalidSeries(
            "spread and positions are not aligned".into(),
        ));
    }
    if !(periods_per_year.is_finite() && periods_per_year > 0.0) {
        return Err(AnalysisError::InvalidSeries(format!(
            "periods per year must be positive, got {periods_per_year}"
        )));
    }

    let s = spread.values();
    let pos = positions.values();

    let mut pnl = Vec::with_capacity(s.len());
    if !s.is_empty() {
        pnl.push(None);
    }
    for t in 1..s.len() {
        pnl.push(pos[t - 1].map(|p| p.as_f64() * (s[t] - s[t - 1])));
    }

    let mut running = 0.0;
    let equity: Vec<Option<f64>> = pnl
        .iter()
        .map(|v| {
            v.map(|x| {
                running += x;
                running
            })
        })
        .collect();

    let realized: Vec<f64> = pnl.iter().filter_map(|v| *v).collect();
    let sharpe = sharpe_ratio(&realized, periods_per_year)?;

    let dates = spread.dates().to_vec();
    Ok(BacktestOutcome {
        pnl: PnlSeries::from_parts(dates.clone(), pnl),
        equity: EquityCurve::from_parts(dates, equity),
        sharpe,
    })
}

/// `sqrt(periods_per_year) * mean / sd` with the sample standard deviation.
///
/// Fewer than two values or a near-zero sd is `DegenerateStatistic`.
pub fn sharpe_ratio(pnl: &[f64], periods_per_year: f64) -> Result<f64, AnalysisError> {
    if pnl.len() < 2 {
        return Err(AnalysisError::degenerate(
            "sharpe ratio",
            format!("need at least 2 pnl observations, got {}", pnl.len()),
        ));
    }
    let sd = sample_std(pnl);
    if is_near_zero(sd) {
        return Err(AnalysisError::degenerate(
            "sharpe ratio",
            format!("pnl standard deviation is {sd:e}"),
        ));
    }
    Ok(periods_per_year.sqrt() * mean(pnl) / sd)
}
