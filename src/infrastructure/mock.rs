use crate::domain::errors::{CandleSeriesError, MarketDataError};
use crate::domain::market::{Candle, CandleSeries, Interval};
use crate::domain::ports::{MarketDataService, ReplySink};
use crate::domain::reply::Reply;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::info;

/// Canned market data with a request counter.
pub struct MockMarketDataService {
    response: Result<CandleSeries, MarketDataError>,
    calls: AtomicUsize,
    last_limit: AtomicUsize,
}

impl MockMarketDataService {
    pub fn new(series: CandleSeries) -> Self {
        Self::with_response(Ok(series))
    }

    pub fn failing(error: MarketDataError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<CandleSeries, MarketDataError>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            last_limit: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_limit(&self) -> usize {
        self.last_limit.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn get_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_limit.store(limit, Ordering::SeqCst);
        info!(
            "MockMarketDataService: {} x {} candles for {}",
            limit, interval, symbol
        );
        self.response.clone()
    }
}

fn mock_start() -> DateTime<Utc> {
    DateTime::from_timestamp(1_714_521_600, 0).unwrap_or_default()
}

/// Hourly candles closing at `closes`, each with a small body and wicks.
pub fn series_from_closes(
    symbol: &str,
    closes: &[f64],
) -> Result<CandleSeries, CandleSeriesError> {
    let start = mock_start();
    let candles = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i % 2 == 0 { close - 40.0 } else { close + 35.0 };
            Candle {
                open_time: start + Duration::hours(i as i64),
                open,
                high: open.max(close) + 60.0,
                low: open.min(close) - 55.0,
                close,
                volume: 400.0 + (i % 7) as f64 * 90.0,
            }
        })
        .collect();
    CandleSeries::new(symbol, candles)
}

/// `count` hourly candles drifting around `base`.
pub fn synthetic_series(
    symbol: &str,
    count: usize,
    base: f64,
) -> Result<CandleSeries, CandleSeriesError> {
    let closes: Vec<f64> = (0..count)
        .map(|i| base + (i as f64 * 0.6).sin() * 350.0 + i as f64 * 12.0)
        .collect();
    series_from_closes(symbol, &closes)
}

/// A photo as it was on disk at delivery time.
#[derive(Debug, Clone)]
pub struct DeliveredPhoto {
    pub path: PathBuf,
    pub bytes: Option<Vec<u8>>,
}

/// Collects replies instead of sending them.
#[derive(Default)]
pub struct RecordingReplySink {
    replies: RwLock<Vec<Reply>>,
    photos: RwLock<Vec<DeliveredPhoto>>,
    fail: bool,
}

impl RecordingReplySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records nothing and rejects every delivery.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn replies(&self) -> Vec<Reply> {
        self.replies.read().await.clone()
    }

    pub async fn texts(&self) -> Vec<String> {
        self.replies
            .read()
            .await
            .iter()
            .filter_map(|r| r.as_text().map(str::to_string))
            .collect()
    }

    pub async fn photos(&self) -> Vec<DeliveredPhoto> {
        self.photos.read().await.clone()
    }
}

#[async_trait]
impl ReplySink for RecordingReplySink {
    async fn deliver(&self, reply: Reply) -> Result<()> {
        if self.fail {
            anyhow::bail!("RecordingReplySink: delivery rejected");
        }

        if let Reply::Photo { path } = &reply {
            let bytes = tokio::fs::read(path).await.ok();
            self.photos.write().await.push(DeliveredPhoto {
                path: path.clone(),
                bytes,
            });
        }
        self.replies.write().await.push(reply);
        Ok(())
    }
}
