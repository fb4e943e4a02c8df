use chrono::{DateTime, Utc};
use thiserror::Error;

/// Violations of the [`CandleSeries`](crate::domain::market::CandleSeries) invariants
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleSeriesError {
    #[error("candle series is empty")]
    Empty,

    #[error("open time at row {index} ({current}) does not follow {previous}")]
    NonIncreasing {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

/// Errors raised while fetching or parsing exchange candles
#[derive(Debug, Clone, Error)]
pub enum MarketDataError {
    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Malformed klines response: {reason}")]
    MalformedResponse { reason: String },

    #[error("No candles returned for {symbol}")]
    Empty { symbol: String },

    #[error("Invalid candle series for {symbol}: {source}")]
    InvalidSeries {
        symbol: String,
        #[source]
        source: CandleSeriesError,
    },
}

/// Errors related to indicator configuration
#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("Invalid indicator parameters: {reason}")]
    InvalidParameters { reason: String },
}

/// Errors raised while drawing a chart image
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Indicator {column} has no defined values ({candles} candles, window {window})")]
    MissingIndicator {
        column: String,
        candles: usize,
        window: usize,
    },

    #[error("Chart drawing failed: {reason}")]
    Drawing { reason: String },

    #[error("Chart render task failed: {reason}")]
    Task { reason: String },
}

/// Failures surfaced at the command-handler boundary
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Requester {requester:?} is not the configured owner")]
    Unauthorized { requester: Option<u64> },

    #[error("Market data unavailable: {0}")]
    DataUnavailable(#[from] MarketDataError),

    #[error("Chart rendering failed: {0}")]
    RenderFailed(#[from] ChartError),
}
