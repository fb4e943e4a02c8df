use crate::domain::errors::{ChartError, MarketDataError};
use crate::domain::market::{AnnotatedSeries, CandleSeries, Interval};
use crate::domain::reply::Reply;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Most recent `limit` candles for `symbol`, oldest first.
    async fn get_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, MarketDataError>;
}

/// Draws an annotated series as a PNG at `target`. CPU-bound; callers run it off the reactor.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &AnnotatedSeries, target: &Path) -> Result<(), ChartError>;
}

#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn deliver(&self, reply: Reply) -> Result<()>;
}
