//! Ordinary least squares.
//!
//! `fit_hedge` is the closed-form two-variable regression `y = alpha + beta*x`
//! used for the hedge ratio. `least_squares` is the general solver used by
//! the ADF regression, where the design matrix has several lag columns.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::error::{AnalysisError, VARIANCE_EPSILON};

/// Minimum observations for a regression with an intercept.
pub const MIN_HEDGE_OBSERVATIONS: usize = 2;

/// Result of regressing y on a constant and x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgeFit {
    pub alpha: f64,
    pub beta: f64,
    pub r_squared: f64,
    pub observations: usize,
}

impl HedgeFit {
    /// `y - alpha - beta * x` for each observation.
    pub fn residuals(&self, y: &[f64], x: &[f64]) -> Vec<f64> {
        y.iter()
            .zip(x)
            .map(|(yi, xi)| yi - self.alpha - self.beta * xi)
            .collect()
    }
}

pub(crate) fn check_pair(y: &[f64], x: &[f64], required: usize) -> Result<(), AnalysisError> {
    if y.len() != x.len() {
        return Err(AnalysisError::LengthMismatch {
            left: y.len(),
            right: x.len(),
        });
    }
    if y.len() < required {
        return Err(AnalysisError::InsufficientAlignment {
            observations: y.len(),
            required,
        });
    }
    if y.iter().chain(x).any(|v| !v.is_finite()) {
        return Err(AnalysisError::InvalidSeries(
            "regression input contains NaN or infinite values".into(),
        ));
    }
    Ok(())
}

/// Fit `y = alpha + beta*x + eps` by OLS.
///
/// Zero variance in `x` leaves beta undefined and is reported as
/// `DegenerateStatistic` instead of returning NaN/Inf.
pub fn fit_hedge(y: &[f64], x: &[f64]) -> Result<HedgeFit, AnalysisError> {
    check_pair(y, x, MIN_HEDGE_OBSERVATIONS)?;

    let n = y.len() as f64;
    let mean_y = y.iter().sum::<f64>() / n;
    let mean_x = x.iter().sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (yi, xi) in y.iter().zip(x) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx / n <= VARIANCE_EPSILON {
        return Err(AnalysisError::degenerate(
            "hedge ratio",
            format!("independent series has near-zero variance ({:e})", sxx / n),
        ));
    }

    let beta = sxy / sxx;
    let alpha = mean_y - beta * mean_x;

    let ss_res: f64 = y
        .iter()
        .zip(x)
        .map(|(yi, xi)| (yi - alpha - beta * xi).powi(2))
        .sum();
    let r_squared = if syy / n <= VARIANCE_EPSILON {
        1.0
    } else {
        1.0 - ss_res / syy
    };

    Ok(HedgeFit {
        alpha,
        beta,
        r_squared,
        observations: y.len(),
    })
}

/// Hedge ratio of `y` on `x`. Both series must share the same index.
pub fn estimate_hedge_ratio(y: &PriceSeries, x: &PriceSeries) -> Result<f64, AnalysisError> {
    if !y.same_index(x) {
        return Err(AnalysisError::InvalidSeries(
            "hedge ratio inputs are not aligned".into(),
        ));
    }
    fit_hedge(y.values(), x.values()).map(|fit| fit.beta)
}

/// General least-squares fit.
#[derive(Debug, Clone)]
pub(crate) struct LeastSquares {
    pub coefficients: DVector<f64>,
    pub ssr: f64,
    pub nobs: usize,
    /// `(X'X)^-1`, for coefficient standard errors.
    pub xtx_inv: DMatrix<f64>,
}

impl LeastSquares {
    pub fn dof(&self) -> usize {
        self.nobs.saturating_sub(self.coefficients.len())
    }

    /// Gaussian log-likelihood, as reported by standard OLS packages.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.coefficients.len() as f64
    }

    /// t-statistic of coefficient `i`, `None` when its standard error is zero.
    pub fn t_stat(&self, i: usize) -> Option<f64> {
        let dof = self.dof();
        if dof == 0 {
            return None;
        }
        let sigma2 = self.ssr / dof as f64;
        let se = (sigma2 * self.xtx_inv[(i, i)]).sqrt();
        if !se.is_finite() || se <= 0.0 {
            return None;
        }
        Some(self.coefficients[i] / se)
    }
}

/// Solve `min ||y - X b||²` through the normal equations.
///
/// Returns `None` when `X'X` is not (numerically) positive definite, i.e. the
/// design has collinear or all-zero columns.
pub(crate) fn least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<LeastSquares> {
    let xt = x.transpose();
    let xtx = &xt * x;
    let diag = xtx.diagonal();
    let chol = xtx.cholesky()?;
    let l = chol.l_dirty();
    if (0..diag.len()).any(|i| l[(i, i)].powi(2) <= 1e-10 * diag[i]) {
        return None;
    }
    let coefficients = chol.solve(&(&xt * y));
    let residuals = y - x * &coefficients;
    Some(LeastSquares {
        ssr: residuals.norm_squared(),
        nobs: x.nrows(),
        xtx_inv: chol.inverse(),
        coefficients,
    })
}
