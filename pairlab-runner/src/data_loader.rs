//! Price loading for one pair.
//!
//! Fetches both legs through a [`PriceProvider`], clips them to the requested
//! range and fails with `DataUnavailable` when the provider has nothing for
//! either ticker. The provider's own fallbacks (retry, circuit breaker) stay
//! inside the provider.

use chrono::NaiveDate;

use pairlab_core::data::{fetch_prices, PriceProvider};
use pairlab_core::domain::PriceSeries;

use crate::pipeline::PipelineError;

/// Raw prices for both legs, before alignment.
#[derive(Debug, Clone)]
pub struct LoadedPair {
    pub ticker1: String,
    pub ticker2: String,
    pub prices1: PriceSeries,
    pub prices2: PriceSeries,
    /// Name of the provider the prices came from.
    pub provider: String,
    /// BLAKE3 over both legs' dates and values.
    pub dataset_hash: String,
}

/// Load `ticker1` and `ticker2` (already normalized) from `start` through
/// `end` inclusive.
pub fn load_pair(
    provider: &dyn PriceProvider,
    ticker1: &str,
    ticker2: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<LoadedPair, PipelineError> {
    let mut fetched = fetch_prices(provider, &[ticker1, ticker2], start, end)?;

    let mut take = |ticker: &str| {
        fetched
            .remove(ticker)
            .map(|s| s.truncate_before(start).truncate_after(end))
            .filter(|s| !s.is_empty())
    };
    let prices1 = take(ticker1);
    let prices2 = take(ticker2);

    let (prices1, prices2) = match (prices1, prices2) {
        (Some(a), Some(b)) => (a, b),
        (None, None) => {
            return Err(PipelineError::DataUnavailable(format!(
                "{} returned no prices for {ticker1} or {ticker2} between {start} and {end}",
                provider.name()
            )))
        }
        (None, Some(_)) => return Err(missing(provider, ticker1, start, end)),
        (Some(_), None) => return Err(missing(provider, ticker2, start, end)),
    };

    tracing::debug!(
        %ticker1,
        %ticker2,
        rows1 = prices1.len(),
        rows2 = prices2.len(),
        provider = provider.name(),
        "loaded pair prices"
    );

    Ok(LoadedPair {
        ticker1: ticker1.to_string(),
        ticker2: ticker2.to_string(),
        dataset_hash: dataset_hash(&prices1, &prices2),
        provider: provider.name().to_string(),
        prices1,
        prices2,
    })
}

fn missing(provider: &dyn PriceProvider, ticker: &str, start: NaiveDate, end: NaiveDate) -> PipelineError {
    PipelineError::DataUnavailable(format!(
        "{ticker} is missing from {} result for {start} to {end}",
        provider.name()
    ))
}

fn dataset_hash(a: &PriceSeries, b: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for series in [a, b] {
        for (date, value) in series.iter() {
            hasher.update(date.to_string().as_bytes());
            hasher.update(&value.to_le_bytes());
        }
        hasher.update(b"\x1e");
    }
    hasher.finalize().to_hex().to_string()
}
