//! Market data configuration parsing from environment variables.
//!
//! Covers the Binance endpoint, the requested pair/interval/limit and the
//! HTTP client's timeout and retry budget.

use super::{EnvLookup, parse_or};
use crate::domain::market::Interval;
use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

/// Binance serves at most this many klines per request
pub const MAX_CANDLE_LIMIT: usize = 1000;

const QUOTE_ASSETS: [&str; 6] = ["FDUSD", "USDT", "USDC", "BUSD", "TUSD", "USD"];

/// Market data environment configuration
#[derive(Debug, Clone)]
pub struct MarketEnvConfig {
    pub base_url: String,
    pub symbol: String,
    pub interval: Interval,
    pub candle_limit: usize,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_retries: u32,
}

impl Default for MarketEnvConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            symbol: "BTCUSDT".to_string(),
            interval: Interval::OneHour,
            candle_limit: 24,
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            max_retries: 3,
        }
    }
}

impl MarketEnvConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let defaults = Self::default();

        let base_url = lookup("BINANCE_BASE_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        url::Url::parse(&base_url).context(format!("Invalid BINANCE_BASE_URL '{}'", base_url))?;

        let symbol = lookup("MARKET_SYMBOL")
            .map(|s| s.trim().to_uppercase())
            .unwrap_or(defaults.symbol);
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            anyhow::bail!("Invalid MARKET_SYMBOL '{}': expected e.g. BTCUSDT", symbol);
        }

        let interval = match lookup("MARKET_INTERVAL") {
            Some(raw) => Interval::from_str(&raw).context("Failed to parse MARKET_INTERVAL")?,
            None => defaults.interval,
        };

        let candle_limit = parse_or(lookup, "MARKET_CANDLE_LIMIT", defaults.candle_limit)?;
        if candle_limit == 0 || candle_limit > MAX_CANDLE_LIMIT {
            anyhow::bail!(
                "MARKET_CANDLE_LIMIT must be between 1 and {}, got {}",
                MAX_CANDLE_LIMIT,
                candle_limit
            );
        }

        let request_timeout_secs = parse_or(lookup, "HTTP_TIMEOUT_SECS", 10u64)?;
        let connect_timeout_secs = parse_or(lookup, "HTTP_CONNECT_TIMEOUT_SECS", 5u64)?;
        if request_timeout_secs == 0 || connect_timeout_secs == 0 {
            anyhow::bail!("HTTP_TIMEOUT_SECS and HTTP_CONNECT_TIMEOUT_SECS must be positive");
        }

        Ok(Self {
            base_url,
            symbol,
            interval,
            candle_limit,
            request_timeout: Duration::from_secs(request_timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            max_retries: parse_or(lookup, "HTTP_MAX_RETRIES", defaults.max_retries)?,
        })
    }

    /// Splits the exchange symbol into base and quote asset, e.g. `BTCUSDT` -> (`BTC`, `USDT`).
    pub fn split_symbol(&self) -> (&str, Option<&str>) {
        for quote in QUOTE_ASSETS {
            if let Some(base) = self.symbol.strip_suffix(quote) {
                if !base.is_empty() {
                    return (base, Some(quote));
                }
            }
        }
        (&self.symbol, None)
    }

    /// Base asset shown in replies, e.g. `BTC`.
    pub fn asset_label(&self) -> &str {
        self.split_symbol().0
    }

    /// Pair shown in chart titles, e.g. `BTC/USDT`.
    pub fn pair_label(&self) -> String {
        match self.split_symbol() {
            (base, Some(quote)) => format!("{}/{}", base, quote),
            (base, None) => base.to_string(),
        }
    }
}
