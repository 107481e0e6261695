//! Pipeline result table and metrics summary.

use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, PolarsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

use pairlab_core::domain::Position;
use pairlab_core::stats::CointegrationReport;

use crate::config::{CacheKey, PairConfig};

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// One fully populated row of the result table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub date: NaiveDate,
    /// Raw price of the first ticker.
    pub price1: f64,
    pub price2: f64,
    /// Price actually analysed (log price when log scale is on).
    pub used1: f64,
    pub used2: f64,
    pub spread: f64,
    pub z_score: f64,
    pub position: Position,
    pub equity: f64,
}

/// Single point in the equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Headline numbers of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub ticker1: String,
    pub ticker2: String,
    pub rows: usize,
    /// First date in the result table.
    pub start: NaiveDate,
    /// Last date in the result table.
    pub end: NaiveDate,
    pub p_value: f64,
    /// Engle-Granger ADF statistic behind `p_value`; `None` for collinear legs.
    pub adf_statistic: Option<f64>,
    pub beta: f64,
    pub sharpe: f64,
}

impl MetricsSummary {
    /// `"T1/T2"`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.ticker1, self.ticker2)
    }
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pair:        {}", self.label())?;
        writeln!(f, "Rows:        {}", self.rows)?;
        writeln!(f, "Date range:  {} to {}", self.start, self.end)?;
        writeln!(f, "p-value:     {:.6}", self.p_value)?;
        writeln!(f, "Beta:        {:.6}", self.beta)?;
        write!(f, "Sharpe:      {:.3}", self.sharpe)
    }
}

/// Complete result of one pair run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub cache_key: CacheKey,
    pub dataset_hash: String,
    pub provider: String,
    /// Normalized configuration that produced this result.
    pub config: PairConfig,
    pub cointegration: CointegrationReport,
    pub summary: MetricsSummary,
    pub rows: Vec<ResultRow>,
}

impl PipelineResult {
    /// `(date, equity)` for every row, for charting.
    pub fn equity_curve(&self) -> Vec<EquityPoint> {
        self.rows
            .iter()
            .map(|r| EquityPoint {
                date: r.date,
                equity: r.equity,
            })
            .collect()
    }

    /// Column labels in table order.
    pub fn column_names(&self) -> Vec<String> {
        let (t1, t2) = (&self.summary.ticker1, &self.summary.ticker2);
        vec![
            "date".to_string(),
            format!("{t1}_price"),
            format!("{t2}_price"),
            format!("{t1}_used"),
            format!("{t2}_used"),
            "spread".to_string(),
            "z_score".to_string(),
            "position".to_string(),
            "equity".to_string(),
        ]
    }

    /// The result table as a polars `DataFrame`, dates as ISO strings.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let names = self.column_names();
        let float = |i: usize, f: fn(&ResultRow) -> f64| {
            let values: Vec<f64> = self.rows.iter().map(f).collect();
            Column::new(names[i].as_str().into(), values)
        };

        let dates: Vec<String> = self.rows.iter().map(|r| r.date.to_string()).collect();
        let positions: Vec<i32> = self
            .rows
            .iter()
            .map(|r| i32::from(r.position.as_i8()))
            .collect();

        DataFrame::new(vec![
            Column::new(names[0].as_str().into(), dates),
            float(1, |r| r.price1),
            float(2, |r| r.price2),
            float(3, |r| r.used1),
            float(4, |r| r.used2),
            float(5, |r| r.spread),
            float(6, |r| r.z_score),
            Column::new(names[7].as_str().into(), positions),
            float(8, |r| r.equity),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairlab_core::stats::{CriticalValues, HedgeFit};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn sample() -> PipelineResult {
        let rows = vec![
            ResultRow {
                date: d(4),
                price1: 10.0,
                price2: 20.0,
                used1: 10.0,
                used2: 20.0,
                spread: 0.5,
                z_score: 2.4,
                position: Position::Short,
                equity: 0.1,
            },
            ResultRow {
                date: d(5),
                price1: 10.5,
                price2: 20.2,
                used1: 10.5,
                used2: 20.2,
                spread: 0.3,
                z_score: 0.2,
                position: Position::Flat,
                equity: 0.3,
            },
        ];
        PipelineResult {
            schema_version: SCHEMA_VERSION,
            cache_key: "k".into(),
            dataset_hash: "h".into(),
            provider: "in_memory".into(),
            config: PairConfig::new("KO", "PEP", d(1), d(29), false),
            cointegration: CointegrationReport {
                statistic: Some(-3.9),
                p_value: 0.0123456789,
                critical_values: CriticalValues {
                    one_pct: -3.9,
                    five_pct: -3.3,
                    ten_pct: -3.0,
                },
                used_lag: 1,
                observations: 2,
                hedge: HedgeFit {
                    alpha: 0.0,
                    beta: 0.5,
                    r_squared: 0.9,
                    observations: 2,
                },
            },
            summary: MetricsSummary {
                ticker1: "KO".into(),
                ticker2: "PEP".into(),
                rows: 2,
                start: d(4),
                end: d(5),
                p_value: 0.0123456789,
                adf_statistic: Some(-3.9),
                beta: 0.5,
                sharpe: 1.23456,
            },
            rows,
        }
    }

    #[test]
    fn summary_display_precision() {
        let text = sample().summary.to_string();
        assert!(text.contains("KO/PEP"));
        assert!(text.contains("Rows:        2"));
        assert!(text.contains("2024-03-04 to 2024-03-05"));
        assert!(text.contains("0.012346"));
        assert!(text.contains("0.500000"));
        assert!(text.contains("1.235"));
    }

    #[test]
    fn dataframe_has_labelled_columns() {
        let df = sample().to_dataframe().unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(
            names,
            [
                "date", "KO_price", "PEP_price", "KO_used", "PEP_used", "spread", "z_score",
                "position", "equity"
            ]
        );
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn equity_curve_follows_rows() {
        let curve = sample().equity_curve();
        assert_eq!(curve.len(), 2);
        assert_eq!(curve[1], EquityPoint { date: d(5), equity: 0.3 });
    }

    #[test]
    fn json_roundtrip_keeps_schema_version() {
        let json = serde_json::to_string(&sample()).unwrap();
        let back: PipelineResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.schema_version, SCHEMA_VERSION);
        assert_eq!(back.rows.len(), 2);
        assert_eq!(back.rows[0].position, Position::Short);
        assert_eq!(back.summary.label(), "KO/PEP");
    }
}
