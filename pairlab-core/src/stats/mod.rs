//! Pair statistics: hedge ratio, ADF, Engle-Granger cointegration.
//!
//! Pure functions over aligned slices. Each returns `Result<_, AnalysisError>`
//! and never hands back NaN/Inf for a degenerate input.

pub mod adf;
pub mod cointegration;
pub mod mackinnon;
pub mod ols;

pub use adf::{adf_test, AdfResult};
pub use cointegration::{cointegration_pvalue, engle_granger, CointegrationReport};
pub use mackinnon::{mackinnon_critical_values, mackinnon_pvalue, CriticalValues};
pub use ols::{estimate_hedge_ratio, fit_hedge, HedgeFit};
