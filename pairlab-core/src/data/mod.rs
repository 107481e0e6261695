//! Price acquisition and alignment.

pub mod align;
pub mod circuit_breaker;
pub mod csv_provider;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use align::{align_pair, AlignedPair};
pub use circuit_breaker::CircuitBreaker;
pub use csv_provider::CsvProvider;
pub use provider::{
    fetch_prices, DataError, DataSource, FetchResult, InMemoryProvider, PriceProvider,
};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
