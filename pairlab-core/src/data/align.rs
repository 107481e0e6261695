//! Two-leg time alignment.
//!
//! The two price series are inner-joined on date. Dates present in only one
//! leg are dropped, as are dates where either value is missing (non-finite).
//! No forward-fill of tradable price data.

use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::domain::PriceSeries;
use crate::error::AnalysisError;

/// Two series restricted to their common dates.
///
/// Invariant: `left` and `right` share an identical, ascending date index and
/// contain only finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    left: PriceSeries,
    right: PriceSeries,
}

impl AlignedPair {
    /// The dependent leg (y).
    pub fn left(&self) -> &PriceSeries {
        &self.left
    }

    /// The independent leg (x).
    pub fn right(&self) -> &PriceSeries {
        &self.right
    }

    pub fn dates(&self) -> &[NaiveDate] {
        self.left.dates()
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Natural log of both legs. Same index.
    pub fn ln(&self) -> Result<Self, AnalysisError> {
        Ok(Self {
            left: self.left.ln()?,
            right: self.right.ln()?,
        })
    }
}

/// Inner-join two series on date.
///
/// Both inputs are already sorted, so a single merge pass suffices.
/// An empty intersection is an error, never an empty pair.
pub fn align_pair(left: &PriceSeries, right: &PriceSeries) -> Result<AlignedPair, AnalysisError> {
    let (ld, lv) = (left.dates(), left.values());
    let (rd, rv) = (right.dates(), right.values());

    let mut dates = Vec::new();
    let mut ys = Vec::new();
    let mut xs = Vec::new();

    let (mut i, mut j) = (0, 0);
    while i < ld.len() && j < rd.len() {
        match ld[i].cmp(&rd[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                if lv[i].is_finite() && rv[j].is_finite() {
                    dates.push(ld[i]);
                    ys.push(lv[i]);
                    xs.push(rv[j]);
                }
                i += 1;
                j += 1;
            }
        }
    }

    if dates.is_empty() {
        return Err(AnalysisError::InsufficientAlignment {
            observations: 0,
            required: 1,
        });
    }

    Ok(AlignedPair {
        left: PriceSeries::from_parts(dates.clone(), ys),
        right: PriceSeries::from_parts(dates, xs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(points: &[(&str, f64)]) -> PriceSeries {
        PriceSeries::from_points(points.iter().map(|(s, v)| (d(s), *v)).collect()).unwrap()
    }

    #[test]
    fn align_keeps_only_common_dates() {
        let ko = series(&[
            ("2024-01-02", 60.0),
            ("2024-01-03", 61.0),
            ("2024-01-04", 62.0),
        ]);
        let pep = series(&[
            ("2024-01-02", 170.0),
            // PEP missing 2024-01-03
            ("2024-01-04", 172.0),
            ("2024-01-05", 173.0),
        ]);

        let aligned = align_pair(&ko, &pep).unwrap();

        assert_eq!(aligned.dates(), &[d("2024-01-02"), d("2024-01-04")]);
        assert_eq!(aligned.left().values(), &[60.0, 62.0]);
        assert_eq!(aligned.right().values(), &[170.0, 172.0]);
    }

    #[test]
    fn align_drops_missing_values() {
        let ko = series(&[("2024-01-02", 60.0), ("2024-01-03", f64::NAN)]);
        let pep = series(&[("2024-01-02", 170.0), ("2024-01-03", 171.0)]);

        let aligned = align_pair(&ko, &pep).unwrap();
        assert_eq!(aligned.len(), 1);
        assert_eq!(aligned.dates(), &[d("2024-01-02")]);
    }

    #[test]
    fn disjoint_series_is_an_error() {
        let ko = series(&[("2024-01-02", 60.0)]);
        let pep = series(&[("2024-01-03", 170.0)]);

        let err = align_pair(&ko, &pep).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientAlignment { observations: 0, .. }
        ));
    }

    #[test]
    fn ln_preserves_index() {
        let ko = series(&[("2024-01-02", 1.0), ("2024-01-03", std::f64::consts::E)]);
        let aligned = align_pair(&ko, &ko).unwrap().ln().unwrap();
        assert_eq!(aligned.left().values()[0], 0.0);
        assert!((aligned.left().values()[1] - 1.0).abs() < 1e-12);
        assert_eq!(aligned.dates(), ko.dates());
    }
}
