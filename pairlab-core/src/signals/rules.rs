//! Threshold rules with carry-forward.
//!
//! The position at `t` depends only on `z[t]` and the position at `t-1`:
//!
//! | condition            | position  |
//! |----------------------|-----------|
//! | `z > entry`          | Short     |
//! | `z < -entry`         | Long      |
//! | `abs(z) < exit`      | Flat      |
//! | otherwise / `z` None | unchanged |
//!
//! Until a rule first fires the position is undefined (`None`).

use serde::{Deserialize, Serialize};

use crate::domain::{Position, PositionSeries, ZScoreSeries};
use crate::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalThresholds {
    /// Enter when `abs(z)` exceeds this.
    pub entry: f64,
    /// Exit when `abs(z)` drops below this.
    pub exit: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            entry: 2.0,
            exit: 0.5,
        }
    }
}

impl SignalThresholds {
    pub fn new(entry: f64, exit: f64) -> Result<Self, AnalysisError> {
        let t = Self { entry, exit };
        t.validate()?;
        Ok(t)
    }

    /// Both finite, `0 <= exit <= entry`.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let ok = self.entry.is_finite()
            && self.exit.is_finite()
            && self.exit >= 0.0
            && self.exit <= self.entry;
        if ok {
            Ok(())
        } else {
            Err(AnalysisError::InvalidSeries(format!(
                "signal thresholds need 0 <= exit <= entry, got entry={} exit={}",
                self.entry, self.exit
            )))
        }
    }
}

/// State carried from one observation to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalState {
    /// No rule has fired yet.
    #[default]
    Undefined,
    Holding(Position),
}

impl SignalState {
    pub fn position(self) -> Option<Position> {
        match self {
            SignalState::Undefined => None,
            SignalState::Holding(p) => Some(p),
        }
    }

    /// Apply one z-score observation.
    pub fn step(self, z: Option<f64>, thresholds: &SignalThresholds) -> Self {
        let Some(z) = z else {
            return self;
        };
        if z > thresholds.entry {
            SignalState::Holding(Position::Short)
        } else if z < -thresholds.entry {
            SignalState::Holding(Position::Long)
        } else if z.abs() < thresholds.exit {
            SignalState::Holding(Position::Flat)
        } else {
            self
        }
    }
}

/// Positions from z-scores using the default 2.0 / 0.5 thresholds.
pub fn signals(z: &ZScoreSeries) -> PositionSeries {
    signals_with(z, &SignalThresholds::default())
}

/// Positions from z-scores with explicit thresholds.
pub fn signals_with(z: &ZScoreSeries, thresholds: &SignalThresholds) -> PositionSeries {
    let mut state = SignalState::Undefined;
    let positions = z
        .values()
        .iter()
        .map(|&zt| {
            state = state.step(zt, thresholds);
            state.position()
        })
        .collect();
    PositionSeries::from_parts(z.dates().to_vec(), positions)
}
