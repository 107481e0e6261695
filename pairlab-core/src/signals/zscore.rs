//! Rolling z-score of the spread.
//!
//! `z[t] = (s[t] - mean(s[t-w+1..=t])) / std(s[t-w+1..=t])` with the sample
//! (n-1) standard deviation. The first `w - 1` entries have no full window
//! and are `None`. Each value only looks at data up to and including `t`.

use crate::domain::series::{is_near_zero, mean, sample_std};
use crate::domain::{Spread, ZScoreSeries};
use crate::error::AnalysisError;

/// Rolling window used when none is configured.
pub const DEFAULT_ZSCORE_WINDOW: usize = 60;

/// Rolling z-score over `window` observations.
///
/// A full window whose standard deviation is at or below
/// [`VARIANCE_EPSILON`](crate::error::VARIANCE_EPSILON) is reported as
/// `DegenerateStatistic` rather than producing an infinite score.
pub fn zscore(spread: &Spread, window: usize) -> Result<ZScoreSeries, AnalysisError> {
    if window < 2 {
        return Err(AnalysisError::InvalidWindow { window });
    }

    let values = spread.values();
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::InvalidSeries(
            "spread contains NaN or infinite values".into(),
        ));
    }

    let mut out = vec![None; values.len()];
    for t in window.saturating_sub(1)..values.len() {
        let slice = &values[t + 1 - window..=t];
        let std = sample_std(slice);
        if is_near_zero(std) {
            return Err(AnalysisError::degenerate(
                "z-score",
                format!(
                    "spread is flat over the {window}-observation window ending {}",
                    spread.dates()[t]
                ),
            ));
        }
        out[t] = Some((values[t] - mean(slice)) / std);
    }

    Ok(ZScoreSeries::from_parts(spread.dates().to_vec(), out))
}
