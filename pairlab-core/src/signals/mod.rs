//! Spread construction, rolling z-score and position rules.
//!
//! These stages look only at the current and past observations: truncating
//! the input after `t` never changes any output at or before `t`.

pub mod rules;
pub mod spread;
pub mod zscore;

pub use rules::{signals, signals_with, SignalState, SignalThresholds};
pub use spread::{build_spread, pair_spread};
pub use zscore::{zscore, DEFAULT_ZSCORE_WINDOW};
