//! Pair run configuration, loadable from TOML.
//!
//! ```toml
//! [pair]
//! ticker1 = "KO"
//! ticker2 = "PEP"
//! start = "2018-01-01"
//! end = "2023-12-31"
//! use_log = true
//!
//! [signal]
//! window = 60
//! entry = 2.0
//! exit = 0.5
//!
//! [backtest]
//! periods_per_year = 252
//! ```
//!
//! Only `[pair]` is required; the other tables fall back to their defaults.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use pairlab_core::backtest::DEFAULT_PERIODS_PER_YEAR;
use pairlab_core::signals::{SignalThresholds, DEFAULT_ZSCORE_WINDOW};

/// Content hash of a normalized configuration, used as the result cache key.
pub type CacheKey = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Trim and uppercase a ticker symbol.
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PairConfig {
    pub pair: PairSpec,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub backtest: BacktestSettings,
}

/// Which two series to analyse, and over what range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PairSpec {
    /// Dependent leg (y).
    pub ticker1: String,
    /// Hedge leg (x).
    pub ticker2: String,
    pub start: NaiveDate,
    /// Inclusive.
    pub end: NaiveDate,
    #[serde(default = "default_use_log")]
    pub use_log: bool,
}

fn default_use_log() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SignalConfig {
    /// Rolling z-score window.
    pub window: usize,
    pub entry: f64,
    pub exit: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        let t = SignalThresholds::default();
        Self {
            window: DEFAULT_ZSCORE_WINDOW,
            entry: t.entry,
            exit: t.exit,
        }
    }
}

impl SignalConfig {
    pub fn thresholds(&self) -> SignalThresholds {
        SignalThresholds {
            entry: self.entry,
            exit: self.exit,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BacktestSettings {
    pub periods_per_year: f64,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
        }
    }
}

impl PairConfig {
    /// Config with default signal and backtest settings.
    pub fn new(ticker1: &str, ticker2: &str, start: NaiveDate, end: NaiveDate, use_log: bool) -> Self {
        Self {
            pair: PairSpec {
                ticker1: ticker1.to_string(),
                ticker2: ticker2.to_string(),
                start,
                end,
                use_log,
            },
            signal: SignalConfig::default(),
            backtest: BacktestSettings::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        for (name, ticker) in [("ticker1", &self.pair.ticker1), ("ticker2", &self.pair.ticker2)] {
            if normalize_ticker(ticker).is_empty() {
                return invalid(format!("pair.{name} is empty"));
            }
        }
        if self.pair.end < self.pair.start {
            return invalid(format!(
                "pair.end {} is before pair.start {}",
                self.pair.end, self.pair.start
            ));
        }
        if self.signal.window < 2 {
            return invalid(format!("signal.window must be >= 2, got {}", self.signal.window));
        }
        self.signal
            .thresholds()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let ppy = self.backtest.periods_per_year;
        if !(ppy.is_finite() && ppy > 0.0) {
            return invalid(format!("backtest.periods_per_year must be positive, got {ppy}"));
        }
        Ok(())
    }

    /// Copy with both tickers normalized.
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        out.pair.ticker1 = normalize_ticker(&self.pair.ticker1);
        out.pair.ticker2 = normalize_ticker(&self.pair.ticker2);
        out
    }

    /// Deterministic BLAKE3 key over every input that affects the result.
    ///
    /// Ticker spelling (case, surrounding whitespace) does not change the key.
    pub fn cache_key(&self) -> CacheKey {
        let c = self.normalized();
        let mut hasher = blake3::Hasher::new();
        for part in [
            c.pair.ticker1,
            c.pair.ticker2,
            c.pair.start.to_string(),
            c.pair.end.to_string(),
            c.pair.use_log.to_string(),
            c.signal.window.to_string(),
            c.signal.entry.to_bits().to_string(),
            c.signal.exit.to_bits().to_string(),
            c.backtest.periods_per_year.to_bits().to_string(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update(b"\x1f");
        }
        hasher.finalize().to_hex().to_string()
    }
}
