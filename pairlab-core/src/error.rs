//! Structured error types for the analytical stages.
//!
//! Every stage boundary returns `Result<_, AnalysisError>` so a statistical
//! edge case is reported where it happens instead of leaking NaN/Inf into
//! downstream series.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("insufficient aligned observations: got {observations}, need at least {required}")]
    InsufficientAlignment { observations: usize, required: usize },

    #[error("degenerate {statistic}: {detail}")]
    DegenerateStatistic {
        statistic: &'static str,
        detail: String,
    },

    #[error("series length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("invalid rolling window {window} (must be >= 2)")]
    InvalidWindow { window: usize },

    #[error("invalid series: {0}")]
    InvalidSeries(String),
}

impl AnalysisError {
    pub(crate) fn degenerate(statistic: &'static str, detail: impl Into<String>) -> Self {
        Self::DegenerateStatistic {
            statistic,
            detail: detail.into(),
        }
    }

    /// True for the zero-variance family of failures.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateStatistic { .. })
    }
}

/// Variance (or standard deviation) at or below this is treated as zero.
pub const VARIANCE_EPSILON: f64 = 1e-12;
