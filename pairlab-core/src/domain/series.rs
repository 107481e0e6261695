//! Date-indexed series.
//!
//! `TimeSeries<T>` pairs a strictly increasing date index with one value per
//! date. Every pipeline stage produces a fresh series on the same index as its
//! input; nothing is mutated in place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, VARIANCE_EPSILON};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries<T> {
    dates: Vec<NaiveDate>,
    values: Vec<T>,
}

/// One instrument's price (or log-price) over time.
pub type PriceSeries = TimeSeries<f64>;

/// `y - beta * x` on the aligned index.
pub type Spread = TimeSeries<f64>;

/// Rolling z-score; `None` while the window is still filling.
pub type ZScoreSeries = TimeSeries<Option<f64>>;

impl<T> TimeSeries<T> {
    /// Build a series, rejecting mismatched lengths and non-increasing dates.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<T>) -> Result<Self, AnalysisError> {
        if dates.len() != values.len() {
            return Err(AnalysisError::LengthMismatch {
                left: dates.len(),
                right: values.len(),
            });
        }
        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(AnalysisError::InvalidSeries(format!(
                "dates must be strictly increasing ({} followed by {})",
                w[0], w[1]
            )));
        }
        Ok(Self { dates, values })
    }

    /// Build from unordered points. Sorts by date; duplicate dates are an error.
    pub fn from_points(mut points: Vec<(NaiveDate, T)>) -> Result<Self, AnalysisError> {
        points.sort_by_key(|(d, _)| *d);
        let (dates, values) = points.into_iter().unzip();
        Self::new(dates, values)
    }

    /// Caller guarantees the index invariant (used when deriving from a valid index).
    pub(crate) fn from_parts(dates: Vec<NaiveDate>, values: Vec<T>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values }
    }

    pub fn empty() -> Self {
        Self {
            dates: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &T)> + '_ {
        self.dates.iter().copied().zip(self.values.iter())
    }

    /// Value at an exact date.
    pub fn get(&self, date: NaiveDate) -> Option<&T> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|i| &self.values[i])
    }

    /// Same index, transformed values.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> TimeSeries<U> {
        TimeSeries {
            dates: self.dates.clone(),
            values: self.values.iter().map(f).collect(),
        }
    }

    pub fn same_index<U>(&self, other: &TimeSeries<U>) -> bool {
        self.dates == other.dates
    }
}

impl<T: Clone> TimeSeries<T> {
    /// Keep only points dated on or before `end`.
    pub fn truncate_after(&self, end: NaiveDate) -> Self {
        let cut = self.dates.partition_point(|d| *d <= end);
        Self {
            dates: self.dates[..cut].to_vec(),
            values: self.values[..cut].to_vec(),
        }
    }

    /// Keep only points dated on or after `start`.
    pub fn truncate_before(&self, start: NaiveDate) -> Self {
        let cut = self.dates.partition_point(|d| *d < start);
        Self {
            dates: self.dates[cut..].to_vec(),
            values: self.values[cut..].to_vec(),
        }
    }
}

impl PriceSeries {
    /// Drop NaN/Inf observations.
    pub fn finite_only(&self) -> Self {
        let (dates, values) = self
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(d, v)| (d, *v))
            .unzip();
        Self { dates, values }
    }

    /// Natural log of every value. Non-positive prices have no log and are rejected.
    pub fn ln(&self) -> Result<Self, AnalysisError> {
        if let Some((date, v)) = self.iter().find(|(_, v)| **v <= 0.0) {
            return Err(AnalysisError::degenerate(
                "log price",
                format!("non-positive price {v} on {date}"),
            ));
        }
        Ok(self.map(|v| v.ln()))
    }
}

// ─── Numeric helpers shared by the stages ───────────────────────────

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

pub(crate) fn is_near_zero(std: f64) -> bool {
    !std.is_finite() || std <= VARIANCE_EPSILON
}
