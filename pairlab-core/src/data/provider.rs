//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over data sources (Yahoo Finance, CSV
//! files, synthetic pairs) so the pipeline never performs I/O itself and tests
//! can inject in-memory providers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::PriceSeries;

/// Structured error types for data operations.
///
/// These are designed to be displayable in CLI output as-is.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("csv error: {0}")]
    Csv(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub prices: PriceSeries,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
    InMemory,
}

/// Trait for price providers.
///
/// Implementations return one (adjusted) closing price per trading day. Any
/// caching sits above this trait.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily prices for a symbol from `start` through `end` inclusive.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}

/// Fetch every ticker and return the ones the provider knows about.
///
/// Unknown symbols are left out of the map rather than failing the batch;
/// the caller decides whether a missing column is fatal. Any other provider
/// error aborts the fetch.
pub fn fetch_prices(
    provider: &dyn PriceProvider,
    tickers: &[&str],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BTreeMap<String, PriceSeries>, DataError> {
    if !provider.is_available() {
        return Err(DataError::CircuitBreakerTripped);
    }

    let mut out = BTreeMap::new();
    for symbol in tickers {
        match provider.fetch(symbol, start, end) {
            Ok(result) => {
                tracing::debug!(
                    symbol = %result.symbol,
                    rows = result.prices.len(),
                    source = ?result.source,
                    "fetched prices"
                );
                out.insert(symbol.to_string(), result.prices.finite_only());
            }
            Err(DataError::SymbolNotFound { symbol }) => {
                tracing::warn!(%symbol, provider = provider.name(), "symbol not found");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Fixed in-memory provider, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: BTreeMap<String, PriceSeries>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: &str, prices: PriceSeries) -> Self {
        self.series.insert(symbol.to_uppercase(), prices);
        self
    }
}

impl PriceProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let prices = self
            .series
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            prices: prices.truncate_before(start).truncate_after(end),
            source: DataSource::InMemory,
        })
    }
}
