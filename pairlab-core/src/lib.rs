//! PairLab Core: price series, data providers, pair statistics, signals, backtest.
//!
//! The analytical stages run strictly left to right:
//! - aligned prices (optionally log-transformed)
//! - Engle-Granger cointegration and OLS hedge ratio
//! - spread, rolling z-score, carry-forward positions
//! - lagged-position P&L, equity and Sharpe ratio
//!
//! Every stage is a pure function returning `Result<_, AnalysisError>`. None
//! of them performs I/O; price fetching lives behind [`data::PriceProvider`].

pub mod backtest;
pub mod data;
pub mod domain;
pub mod error;
pub mod signals;
pub mod stats;

pub use error::AnalysisError;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public result types can cross threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<domain::ZScoreSeries>();
        require_sync::<domain::ZScoreSeries>();
        require_send::<domain::PositionSeries>();
        require_sync::<domain::PositionSeries>();
        require_send::<data::AlignedPair>();
        require_sync::<data::AlignedPair>();

        // Stage outputs
        require_send::<stats::HedgeFit>();
        require_sync::<stats::HedgeFit>();
        require_send::<stats::CointegrationReport>();
        require_sync::<stats::CointegrationReport>();
        require_send::<signals::SignalThresholds>();
        require_sync::<signals::SignalThresholds>();
        require_send::<backtest::BacktestOutcome>();
        require_sync::<backtest::BacktestOutcome>();
        require_send::<AnalysisError>();
        require_sync::<AnalysisError>();

        // Providers
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
        require_send::<data::CsvProvider>();
        require_sync::<data::CsvProvider>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();
        require_send::<data::InMemoryProvider>();
        require_sync::<data::InMemoryProvider>();
    }

    /// Providers are usable as trait objects.
    #[test]
    fn providers_are_object_safe() {
        let providers: Vec<Box<dyn data::PriceProvider>> = vec![
            Box::new(data::SyntheticProvider::default()),
            Box::new(data::InMemoryProvider::new()),
        ];
        assert!(providers.iter().all(|p| !p.name().is_empty()));
    }
}
