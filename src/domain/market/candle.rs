use crate::domain::errors::CandleSeriesError;
use chrono::{DateTime, Utc};

/// One OHLCV bar, keyed by its opening time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Non-empty run of candles with strictly increasing open times, most recent last.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries {
    symbol: String,
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(symbol: impl Into<String>, candles: Vec<Candle>) -> Result<Self, CandleSeriesError> {
        if candles.is_empty() {
            return Err(CandleSeriesError::Empty);
        }

        for (index, pair) in candles.windows(2).enumerate() {
            if pair[1].open_time <= pair[0].open_time {
                return Err(CandleSeriesError::NonIncreasing {
                    index: index + 1,
                    previous: pair[0].open_time,
                    current: pair[1].open_time,
                });
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            candles,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Always false for a constructed series.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.candles.iter().map(|c| c.close)
    }

    pub fn last(&self) -> &Candle {
        // Non-empty by construction
        &self.candles[self.candles.len() - 1]
    }

    pub fn last_close(&self) -> f64 {
        self.last().close
    }

    pub fn first_open_time(&self) -> DateTime<Utc> {
        self.candles[0].open_time
    }

    pub fn last_open_time(&self) -> DateTime<Utc> {
        self.last().open_time
    }
}
