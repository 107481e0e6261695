//! Spread exposure.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::series::TimeSeries;

/// Exposure to the spread `y - beta * x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Short the spread (sell y, buy beta units of x).
    Short,
    Flat,
    /// Long the spread (buy y, sell beta units of x).
    Long,
}

impl Position {
    /// -1, 0 or +1.
    pub fn as_i8(self) -> i8 {
        match self {
            Position::Short => -1,
            Position::Flat => 0,
            Position::Long => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.as_i8())
    }

    pub fn is_flat(self) -> bool {
        self == Position::Flat
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

/// Positions over time; `None` until the first signal rule fires.
pub type PositionSeries = TimeSeries<Option<Position>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values() {
        assert_eq!(Position::Short.as_i8(), -1);
        assert_eq!(Position::Flat.as_f64(), 0.0);
        assert_eq!(Position::Long.to_string(), "1");
    }
}
