//! Result export: CSV table, Parquet table, equity CSV and JSON summary.
//!
//! JSON artifacts carry a `schema_version`. Unknown (newer) versions are
//! rejected on load.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use polars::prelude::ParquetWriter;
use serde::{Deserialize, Serialize};

use pairlab_core::stats::CointegrationReport;

use crate::config::PairConfig;
use crate::result::{MetricsSummary, PipelineResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a full `PipelineResult` to pretty JSON.
pub fn export_json(result: &PipelineResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize PipelineResult to JSON")
}

/// Deserialize a `PipelineResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<PipelineResult> {
    let result: PipelineResult =
        serde_json::from_str(json).context("failed to deserialize PipelineResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

/// Headline numbers and provenance, without the row table.
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub schema_version: u32,
    pub summary: MetricsSummary,
    pub cointegration: CointegrationReport,
    pub config: PairConfig,
    pub cache_key: String,
    pub dataset_hash: String,
    pub provider: String,
}

impl From<&PipelineResult> for SummaryDocument {
    fn from(r: &PipelineResult) -> Self {
        Self {
            schema_version: r.schema_version,
            summary: r.summary.clone(),
            cointegration: r.cointegration,
            config: r.config.clone(),
            cache_key: r.cache_key.clone(),
            dataset_hash: r.dataset_hash.clone(),
            provider: r.provider.clone(),
        }
    }
}

pub fn export_summary_json(result: &PipelineResult) -> Result<String> {
    serde_json::to_string_pretty(&SummaryDocument::from(result))
        .context("failed to serialize summary to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// The result table as CSV, one row per date.
///
/// Columns: date, {T1}_price, {T2}_price, {T1}_used, {T2}_used, spread,
/// z_score, position, equity
pub fn export_results_csv(result: &PipelineResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(result.column_names())?;

    for r in &result.rows {
        wtr.write_record([
            r.date.to_string(),
            r.price1.to_string(),
            r.price2.to_string(),
            r.used1.to_string(),
            r.used2.to_string(),
            r.spread.to_string(),
            r.z_score.to_string(),
            r.position.to_string(),
            r.equity.to_string(),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// `date,equity` for every row.
pub fn write_equity_csv(path: &Path, result: &PipelineResult) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create equity CSV {}", path.display()))?;
    for point in result.equity_curve() {
        wtr.serialize(point)?;
    }
    wtr.flush()
        .with_context(|| format!("failed to flush equity CSV {}", path.display()))?;
    Ok(())
}

// ─── Parquet export ─────────────────────────────────────────────────

pub fn write_results_parquet(path: &Path, result: &PipelineResult) -> Result<()> {
    let mut df = result
        .to_dataframe()
        .context("failed to build result dataframe")?;
    let mut file = File::create(path)
        .with_context(|| format!("failed to create parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("failed to write result parquet")?;
    Ok(())
}

// ─── Bundle ─────────────────────────────────────────────────────────

/// Files written by [`export_all`].
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub results_csv: PathBuf,
    pub results_parquet: PathBuf,
    pub equity_csv: PathBuf,
    pub summary_json: PathBuf,
}

/// Write every artifact into `dir`, creating it if needed.
pub fn export_all(dir: &Path, result: &PipelineResult) -> Result<ExportPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let paths = ExportPaths {
        results_csv: dir.join("results.csv"),
        results_parquet: dir.join("results.parquet"),
        equity_csv: dir.join("equity.csv"),
        summary_json: dir.join("summary.json"),
    };

    std::fs::write(&paths.results_csv, export_results_csv(result)?)
        .with_context(|| format!("failed to write {}", paths.results_csv.display()))?;
    write_results_parquet(&paths.results_parquet, result)?;
    write_equity_csv(&paths.equity_csv, result)?;
    std::fs::write(&paths.summary_json, export_summary_json(result)?)
        .with_context(|| format!("failed to write {}", paths.summary_json.display()))?;

    tracing::info!(dir = %dir.display(), rows = result.rows.len(), "exported results");
    Ok(paths)
}
