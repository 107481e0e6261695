//! Hedged spread `y - beta * x`.

use crate::data::AlignedPair;
use crate::domain::{PriceSeries, Spread};
use crate::error::AnalysisError;

/// Spread of `y` against `x` at hedge ratio `beta`, on their shared index.
pub fn build_spread(y: &PriceSeries, x: &PriceSeries, beta: f64) -> Result<Spread, AnalysisError> {
    if !y.same_index(x) {
        return Err(AnalysisError::InvalidSeries(
            "spread legs are not aligned".into(),
        ));
    }
    if !beta.is_finite() {
        return Err(AnalysisError::InvalidSeries(format!(
            "hedge ratio must be finite, got {beta}"
        )));
    }
    let values = y
        .values()
        .iter()
        .zip(x.values())
        .map(|(yi, xi)| yi - beta * xi)
        .collect();
    Ok(Spread::from_parts(y.dates().to_vec(), values))
}

/// Spread of an aligned pair, left leg against right leg.
pub fn pair_spread(pair: &AlignedPair, beta: f64) -> Result<Spread, AnalysisError> {
    build_spread(pair.left(), pair.right(), beta)
}
