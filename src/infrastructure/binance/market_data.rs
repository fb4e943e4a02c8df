//! Binance Market Data Service
//!
//! Fetches recent candles (klines) from the public Binance REST API:
//! - One `GET /api/v3/klines?symbol=..&interval=..&limit=..` per request
//! - Transient failures retried by the HTTP client middleware
//! - Fixed-width kline rows parsed into a [`CandleSeries`]

use crate::config::MarketEnvConfig;
use crate::domain::errors::{CandleSeriesError, MarketDataError};
use crate::domain::market::{Candle, CandleSeries, Interval};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, HttpClientSettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

const KLINES_PATH: &str = "/api/v3/klines";
const MAX_ERROR_BODY_CHARS: usize = 200;

pub struct BinanceMarketDataService {
    client: ClientWithMiddleware,
    base_url: String,
}

impl BinanceMarketDataService {
    pub fn builder() -> BinanceMarketDataServiceBuilder {
        BinanceMarketDataServiceBuilder::default()
    }

    pub fn from_config(config: &MarketEnvConfig) -> Result<Self> {
        Self::builder()
            .base_url(config.base_url.clone())
            .http_settings(HttpClientSettings::from(config))
            .build()
    }

    fn klines_url(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Url, MarketDataError> {
        let limit = limit.to_string();
        Url::parse_with_params(
            &format!("{}{}", self.base_url, KLINES_PATH),
            &[
                ("symbol", symbol),
                ("interval", interval.to_binance_string()),
                ("limit", limit.as_str()),
            ],
        )
        .map_err(|e| MarketDataError::Transport {
            endpoint: self.base_url.clone(),
            reason: format!("invalid klines URL: {}", e),
        })
    }
}

#[derive(Default)]
pub struct BinanceMarketDataServiceBuilder {
    base_url: Option<String>,
    http_settings: Option<HttpClientSettings>,
}

impl BinanceMarketDataServiceBuilder {
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn http_settings(mut self, settings: HttpClientSettings) -> Self {
        self.http_settings = Some(settings);
        self
    }

    pub fn build(self) -> Result<BinanceMarketDataService> {
        let base_url = self
            .base_url
            .context("base_url is required")?
            .trim_end_matches('/')
            .to_string();
        let client = HttpClientFactory::create_client(self.http_settings.unwrap_or_default())?;

        Ok(BinanceMarketDataService { client, base_url })
    }
}

#[async_trait]
impl MarketDataService for BinanceMarketDataService {
    async fn get_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries, MarketDataError> {
        let url = self.klines_url(symbol, interval, limit)?;
        let endpoint = format!("{}{}", self.base_url, KLINES_PATH);

        debug!(
            "BinanceMarketDataService: Requesting {} x {} klines for {}",
            limit, interval, symbol
        );

        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            warn!("BinanceMarketDataService: klines request failed: {}", e);
            MarketDataError::Transport {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::Transport {
                endpoint: endpoint.clone(),
                reason: format!("failed to read response body: {}", e),
            })?;

        if !status.is_success() {
            warn!(
                "BinanceMarketDataService: klines fetch failed with HTTP {}",
                status
            );
            return Err(MarketDataError::HttpStatus {
                endpoint,
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let series = parse_klines(symbol, &body)?;

        info!(
            "BinanceMarketDataService: Fetched {} bars for {} (last close {:.2})",
            series.len(),
            symbol,
            series.last_close()
        );

        Ok(series)
    }
}

/// Binance kline row: open time, OHLC, volume, close time, quote volume,
/// trade count, taker buy base, taker buy quote, ignore.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawKline(
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    u64,
    String,
    String,
    String,
);

/// Parses a klines response body into a validated series.
pub fn parse_klines(symbol: &str, body: &str) -> Result<CandleSeries, MarketDataError> {
    let rows: Vec<RawKline> =
        serde_json::from_str(body).map_err(|e| MarketDataError::MalformedResponse {
            reason: e.to_string(),
        })?;

    if rows.is_empty() {
        return Err(MarketDataError::Empty {
            symbol: symbol.to_string(),
        });
    }

    let candles = rows
        .into_iter()
        .enumerate()
        .map(|(row, kline)| to_candle(row, kline))
        .collect::<Result<Vec<_>, _>>()?;

    CandleSeries::new(symbol, candles).map_err(|source| match source {
        CandleSeriesError::Empty => MarketDataError::Empty {
            symbol: symbol.to_string(),
        },
        other => MarketDataError::InvalidSeries {
            symbol: symbol.to_string(),
            source: other,
        },
    })
}

fn to_candle(row: usize, kline: RawKline) -> Result<Candle, MarketDataError> {
    let open_time: DateTime<Utc> =
        DateTime::from_timestamp_millis(kline.0).ok_or_else(|| {
            MarketDataError::MalformedResponse {
                reason: format!("row {}: open time {} out of range", row, kline.0),
            }
        })?;

    let field = |name: &str, raw: &str| -> Result<f64, MarketDataError> {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| MarketDataError::MalformedResponse {
                reason: format!("row {}: {} '{}' is not a number", row, name, raw),
            })
    };

    Ok(Candle {
        open_time,
        open: field("open", &kline.1)?,
        high: field("high", &kline.2)?,
        low: field("low", &kline.3)?,
        close: field("close", &kline.4)?,
        volume: field("volume", &kline.5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_KLINES: &str = r#"[
        [1709251200000, "61000.10", "61500.00", "60800.55", "61420.01", "1234.5", 1709254799999, "75000000.0", 45000, "600.1", "36000000.0", "0"],
        [1709254800000, "61420.01", "62000.00", "61300.00", "61890.50", "987.25", 1709258399999, "61000000.0", 38000, "500.0", "30000000.0", "0"]
    ]"#;

    #[test]
    fn test_parse_klines_reads_ohlcv() {
        let series = parse_klines("BTCUSDT", TWO_KLINES).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.symbol(), "BTCUSDT");

        let first = &series.candles()[0];
        assert_eq!(first.open_time.timestamp_millis(), 1709251200000);
        assert_eq!(first.open, 61000.10);
        assert_eq!(first.high, 61500.00);
        assert_eq!(first.low, 60800.55);
        assert_eq!(first.close, 61420.01);
        assert_eq!(first.volume, 1234.5);
        assert_eq!(series.last_close(), 61890.50);
    }

    #[test]
    fn test_parse_klines_empty_array_is_empty_error() {
        let err = parse_klines("BTCUSDT", "[]").unwrap_err();
        assert!(matches!(err, MarketDataError::Empty { .. }));
    }

    #[test]
    fn test_parse_klines_rejects_non_json() {
        let err = parse_klines("BTCUSDT", "<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_klines_rejects_error_object() {
        let err = parse_klines("BTCUSDT", r#"{"code":-1121,"msg":"Invalid symbol."}"#).unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_klines_rejects_short_rows() {
        let err = parse_klines("BTCUSDT", r#"[[1709251200000, "1", "2", "0.5", "1.5", "10"]]"#)
            .unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_klines_rejects_non_numeric_price() {
        let body = r#"[[1709251200000, "61000", "61500", "60800", "abc", "1", 1709254799999, "0", 1, "0", "0", "0"]]"#;
        let err = parse_klines("BTCUSDT", body).unwrap_err();
        match err {
            MarketDataError::MalformedResponse { reason } => assert!(reason.contains("close")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_klines_rejects_unordered_rows() {
        let body = r#"[
            [1709254800000, "1", "1", "1", "1", "1", 1709258399999, "0", 1, "0", "0", "0"],
            [1709251200000, "1", "1", "1", "1", "1", 1709254799999, "0", 1, "0", "0", "0"]
        ]"#;
        let err = parse_klines("BTCUSDT", body).unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidSeries { .. }));
    }

    #[test]
    fn test_klines_url_carries_query() {
        let service = BinanceMarketDataService::builder()
            .base_url("https://api.binance.com/".to_string())
            .build()
            .unwrap();
        let url = service
            .klines_url("BTCUSDT", Interval::OneHour, 24)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.binance.com/api/v3/klines?symbol=BTCUSDT&interval=1h&limit=24"
        );
    }

    #[test]
    fn test_builder_requires_base_url() {
        assert!(BinanceMarketDataService::builder().build().is_err());
    }
}
