//! MacKinnon response-surface p-values and critical values for the
//! Engle-Granger test with two variables and a constant.
//!
//! p-values: MacKinnon (1994), "Approximate asymptotic distribution functions
//! for unit-root and cointegration tests". Critical values: MacKinnon (2010)
//! finite-sample response surfaces.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

/// Above this the p-value is 1.
const TAU_MAX: f64 = 0.92;
/// Below this the p-value is 0.
const TAU_MIN: f64 = -18.86;
/// Switch point between the small-p and large-p polynomials.
const TAU_STAR: f64 = -2.62;

const SMALL_P: [f64; 3] = [2.92, 1.5012, 3.9796e-2];
const LARGE_P: [f64; 4] = [2.1945, 6.4695e-1, -2.9198e-1, -4.2377e-2];

/// Rows are 1%, 5%, 10%; columns are `b0 + b1/T + b2/T²`.
const CRIT_2010: [[f64; 3]; 3] = [
    [-3.89644, -10.9519, -22.527],
    [-3.33613, -6.1101, -6.823],
    [-3.04445, -4.2412, -2.720],
];

fn polyval(coef: &[f64], x: f64) -> f64 {
    coef.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

/// Approximate p-value of an Engle-Granger ADF statistic (two series, constant).
pub fn mackinnon_pvalue(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let z = if statistic <= TAU_STAR {
        polyval(&SMALL_P, statistic)
    } else {
        polyval(&LARGE_P, statistic)
    };
    standard_normal_cdf(z).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

/// Finite-sample critical values for `nobs` observations.
pub fn mackinnon_critical_values(nobs: usize) -> CriticalValues {
    let t = nobs.max(1) as f64;
    let at = |row: &[f64; 3]| row[0] + row[1] / t + row[2] / (t * t);
    CriticalValues {
        one_pct: at(&CRIT_2010[0]),
        five_pct: at(&CRIT_2010[1]),
        ten_pct: at(&CRIT_2010[2]),
    }
}
