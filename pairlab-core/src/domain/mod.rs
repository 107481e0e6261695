//! Domain types: date-indexed series and spread positions.

pub mod position;
pub mod series;

pub use position::{Position, PositionSeries};
pub use series::{PriceSeries, Spread, TimeSeries, ZScoreSeries};
