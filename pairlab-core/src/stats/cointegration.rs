//! Engle-Granger two-step cointegration test.
//!
//! Step 1 regresses y on a constant and x. Step 2 runs an ADF test (no
//! deterministic terms, AIC lag selection) on the residuals and converts the
//! statistic to a p-value with MacKinnon's two-variable surface.
//!
//! The p-value is informational: nothing downstream gates on it.

use serde::{Deserialize, Serialize};

use super::adf::{adf_test, MIN_ADF_OBSERVATIONS};
use super::mackinnon::{mackinnon_critical_values, mackinnon_pvalue, CriticalValues};
use super::ols::{check_pair, fit_hedge, HedgeFit};
use crate::domain::PriceSeries;
use crate::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CointegrationReport {
    /// ADF t-statistic of the residuals. `None` when the legs are collinear
    /// and the residuals carry no information.
    pub statistic: Option<f64>,
    pub p_value: f64,
    pub critical_values: CriticalValues,
    /// Lagged differences used in the residual ADF regression.
    pub used_lag: usize,
    pub observations: usize,
    /// First-step regression of y on x.
    pub hedge: HedgeFit,
}

impl CointegrationReport {
    /// Residual statistic is below the 5% critical value. Collinear legs
    /// always reject.
    pub fn rejects_at_5pct(&self) -> bool {
        self.statistic
            .map_or(true, |s| s < self.critical_values.five_pct)
    }

    pub fn is_collinear(&self) -> bool {
        self.statistic.is_none()
    }
}

/// R² at or above this means the residuals carry no information.
fn collinearity_threshold() -> f64 {
    1.0 - 100.0 * f64::EPSILON.sqrt()
}

/// Run the Engle-Granger test of `y` on `x`.
///
/// Collinear legs report no statistic and a p-value of 0.
pub fn engle_granger(y: &[f64], x: &[f64]) -> Result<CointegrationReport, AnalysisError> {
    check_pair(y, x, MIN_ADF_OBSERVATIONS)?;

    let hedge = fit_hedge(y, x)?;
    let critical_values = mackinnon_critical_values(y.len() - 1);

    if hedge.r_squared >= collinearity_threshold() {
        tracing::warn!(
            r_squared = hedge.r_squared,
            "series are (almost) perfectly collinear; cointegration test is not reliable"
        );
        return Ok(CointegrationReport {
            statistic: None,
            p_value: 0.0,
            critical_values,
            used_lag: 0,
            observations: y.len(),
            hedge,
        });
    }

    let residuals = hedge.residuals(y, x);
    let adf = adf_test(&residuals, None)?;

    Ok(CointegrationReport {
        statistic: Some(adf.statistic),
        p_value: mackinnon_pvalue(adf.statistic),
        critical_values,
        used_lag: adf.used_lag,
        observations: y.len(),
        hedge,
    })
}

/// p-value of the Engle-Granger test; lower means stronger evidence of
/// cointegration. Both series must share the same index.
pub fn cointegration_pvalue(y: &PriceSeries, x: &PriceSeries) -> Result<f64, AnalysisError> {
    if !y.same_index(x) {
        return Err(AnalysisError::InvalidSeries(
            "cointegration inputs are not aligned".into(),
        ));
    }
    engle_granger(y.values(), x.values()).map(|r| r.p_value)
}
