//! Augmented Dickey-Fuller regression without deterministic terms.
//!
//! Regresses `Δx[t]` on `x[t-1]` and `k` lagged differences, choosing `k` by
//! AIC over a common sample, then re-fits the chosen lag on the longest sample
//! it allows. The statistic is the t-ratio on the lagged level.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::ols::{least_squares, LeastSquares};
use crate::error::AnalysisError;

/// Shortest series the test can run on: one level regressor plus one
/// residual degree of freedom.
pub const MIN_ADF_OBSERVATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    /// t-ratio on the lagged level.
    pub statistic: f64,
    /// Number of lagged differences selected.
    pub used_lag: usize,
    /// Observations in the final regression.
    pub nobs: usize,
    /// Largest lag considered.
    pub max_lag: usize,
    /// AIC of the selected model on the common sample.
    pub best_aic: f64,
}

/// Schwert's rule `ceil(12 * (n/100)^(1/4))`, capped so the regression keeps
/// at least half the sample.
pub fn default_max_lag(n: usize) -> Option<usize> {
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let cap = (n / 2).checked_sub(1)?;
    Some(schwert.min(cap))
}

/// Design for lag `lag`, using rows whose diff index starts at `first`.
///
/// Row for diff index `j`: `[x[j], Δx[j-1], ..., Δx[j-lag]]`, target `Δx[j]`.
fn design(x: &[f64], diffs: &[f64], lag: usize, first: usize) -> (DMatrix<f64>, DVector<f64>) {
    let rows = diffs.len() - first;
    let cols = lag + 1;
    let m = DMatrix::from_fn(rows, cols, |r, c| {
        let j = first + r;
        if c == 0 {
            x[j]
        } else {
            diffs[j - c]
        }
    });
    let target = DVector::from_iterator(rows, diffs[first..].iter().copied());
    (m, target)
}

fn fit(x: &[f64], diffs: &[f64], lag: usize, first: usize) -> Option<LeastSquares> {
    let (m, target) = design(x, diffs, lag, first);
    least_squares(&m, &target).filter(|ls| ls.dof() > 0)
}

/// Run the ADF test on `x` with AIC lag selection up to `max_lag`
/// (default: `default_max_lag`).
pub fn adf_test(x: &[f64], max_lag: Option<usize>) -> Result<AdfResult, AnalysisError> {
    let n = x.len();
    let insufficient = || AnalysisError::InsufficientAlignment {
        observations: n,
        required: MIN_ADF_OBSERVATIONS,
    };
    if n < MIN_ADF_OBSERVATIONS {
        return Err(insufficient());
    }
    let cap = default_max_lag(n).ok_or_else(insufficient)?;
    let max_lag = max_lag.map_or(cap, |m| m.min(cap));

    let diffs: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    // Every candidate lag shares the sample implied by the largest lag.
    let mut best: Option<(usize, f64)> = None;
    for lag in 0..=max_lag {
        let Some(ls) = fit(x, &diffs, lag, max_lag) else {
            continue;
        };
        let aic = ls.aic();
        if !aic.is_finite() {
            continue;
        }
        if best.map_or(true, |(_, b)| aic < b) {
            best = Some((lag, aic));
        }
    }

    let (used_lag, best_aic) = best.ok_or_else(|| {
        AnalysisError::degenerate("ADF statistic", "no lag length produced a usable regression")
    })?;

    let final_fit = fit(x, &diffs, used_lag, used_lag).ok_or_else(|| {
        AnalysisError::degenerate("ADF statistic", "singular regression at selected lag")
    })?;
    let statistic = final_fit.t_stat(0).ok_or_else(|| {
        AnalysisError::degenerate("ADF statistic", "zero standard error on lagged level")
    })?;

    Ok(AdfResult {
        statistic,
        used_lag,
        nobs: final_fit.nobs,
        max_lag,
        best_aic,
    })
}
