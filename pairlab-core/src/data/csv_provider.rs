//! CSV directory provider.
//!
//! Layout: `{dir}/{SYMBOL}.csv` with a header row. The date column is `date`
//! (YYYY-MM-DD); the price column is the first of `adj_close`, `Adj Close`,
//! `close`, `Close` that is present.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use super::provider::{DataError, DataSource, FetchResult, PriceProvider};
use crate::domain::PriceSeries;

const PRICE_COLUMNS: [&str; 4] = ["adj_close", "Adj Close", "close", "Close"];

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn symbol_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read(path: &Path) -> Result<PriceSeries, DataError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?;

        let headers = reader
            .headers()
            .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?
            .clone();
        let date_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("date"))
            .ok_or_else(|| DataError::Csv(format!("{}: no 'date' column", path.display())))?;
        let price_idx = PRICE_COLUMNS
            .iter()
            .find_map(|name| headers.iter().position(|h| h == *name))
            .ok_or_else(|| {
                DataError::Csv(format!("{}: no close/adj_close column", path.display()))
            })?;

        let mut points = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?;
            let raw_date = record.get(date_idx).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
                DataError::Csv(format!("{} row {}: bad date '{raw_date}': {e}", path.display(), line + 1))
            })?;
            // Blank or unparsable prices are missing values, dropped later by alignment.
            let price = record
                .get(price_idx)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .unwrap_or(f64::NAN);
            points.push((date, price));
        }

        PriceSeries::from_points(points)
            .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))
    }
}

impl PriceProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.symbol_path(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let prices = Self::read(&path)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            prices: prices.truncate_before(start).truncate_after(end),
            source: DataSource::CsvImport,
        })
    }
}
