pub mod candle;
pub mod indicators;
pub mod interval;

pub use candle::{Candle, CandleSeries};
pub use indicators::{AnnotatedSeries, IndicatorColumn, IndicatorRow, IndicatorSettings};
pub use interval::Interval;
