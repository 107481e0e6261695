//! PairLab Runner: pair pipeline orchestration, configuration, caching, export.
//!
//! This crate builds on `pairlab-core` to provide:
//! - TOML configuration with a content-hash cache key
//! - Price loading through any `PriceProvider`
//! - The end-to-end pair pipeline (`run_pair`, `run_config`)
//! - An in-process result cache with injectable clock
//! - CSV, Parquet and JSON export

pub mod cache;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod pipeline;
pub mod result;

pub use cache::{Clock, ManualClock, ResultCache, SystemClock};
pub use config::{normalize_ticker, CacheKey, ConfigError, PairConfig};
pub use data_loader::{load_pair, LoadedPair};
pub use export::{export_all, ExportPaths};
pub use pipeline::{run_cached, run_config, run_pair, PipelineError};
pub use result::{EquityPoint, MetricsSummary, PipelineResult, ResultRow};
