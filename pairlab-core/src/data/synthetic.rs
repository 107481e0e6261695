//! Synthetic cointegrated prices for offline runs.
//!
//! Every symbol loads on one shared random-walk factor and adds its own
//! mean-reverting AR(1) noise, so any two symbols form a cointegrated pair in
//! log space. Output is deterministic: the factor uses a fixed seed and each
//! symbol's loading/noise are seeded from a BLAKE3 hash of its name.
//!
//! These prices are clearly fake and tagged `DataSource::Synthetic`.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataSource, FetchResult, PriceProvider};
use crate::domain::PriceSeries;

const FACTOR_SEED: &[u8] = b"pairlab-common-factor";

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    /// Persistence of the idiosyncratic AR(1) noise (0 = white noise).
    pub noise_persistence: f64,
    /// Half-width of the uniform daily shock on the common factor.
    pub factor_vol: f64,
    /// Half-width of the uniform daily shock on the idiosyncratic noise.
    pub noise_vol: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            noise_persistence: 0.9,
            factor_vol: 0.02,
            noise_vol: 0.01,
        }
    }
}

fn rng_for(bytes: &[u8]) -> StdRng {
    StdRng::from_seed(*blake3::hash(bytes).as_bytes())
}

/// Uniform draw in `(-half_width, half_width)`. A zero, negative or NaN
/// width means no shock and consumes no randomness.
fn shock(rng: &mut StdRng, half_width: f64) -> f64 {
    if half_width > 0.0 && half_width.is_finite() {
        rng.gen_range(-half_width..half_width)
    } else {
        0.0
    }
}

/// Weekdays from `start` through `end` inclusive.
fn trading_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

impl SyntheticProvider {
    pub fn generate(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> PriceSeries {
        let dates = trading_days(start, end);

        let mut factor_rng = rng_for(FACTOR_SEED);
        let mut own_rng = rng_for(symbol.as_bytes());

        let base = own_rng.gen_range(20.0..200.0_f64).ln();
        let loading = own_rng.gen_range(0.5..1.5_f64);

        let mut factor = 0.0_f64;
        let mut noise = 0.0_f64;
        let values = dates
            .iter()
            .map(|_| {
                factor += shock(&mut factor_rng, self.factor_vol);
                noise = self.noise_persistence * noise + shock(&mut own_rng, self.noise_vol);
                (base + loading * factor + noise).exp()
            })
            .collect();

        PriceSeries::from_parts(dates, values)
    }
}

impl PriceProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        tracing::debug!(symbol, "generating synthetic prices");
        Ok(FetchResult {
            symbol: symbol.to_string(),
            prices: self.generate(symbol, start, end),
            source: DataSource::Synthetic,
        })
    }
}
