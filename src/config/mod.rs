//! Configuration module for Bitcoin Pulse.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Bot credentials, Market data, and Chart rendering.
//! Configuration is read once at startup and passed explicitly; nothing reads the
//! environment afterwards.

mod bot_config;
mod chart_config;
mod market_config;

pub use bot_config::BotEnvConfig;
pub use chart_config::{ChartEnvConfig, MAX_CHART_DIMENSION};
pub use market_config::{MAX_CANDLE_LIMIT, MarketEnvConfig};

use crate::domain::market::IndicatorSettings;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Source of configuration values, keyed by variable name.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot: BotEnvConfig,
    pub market: MarketEnvConfig,
    pub chart: ChartEnvConfig,
    pub indicators: IndicatorSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails fast when `TELEGRAM_TOKEN` or `OWNER_ID` is missing or invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let bot = BotEnvConfig::from_lookup(lookup).context("Failed to load bot config")?;
        let market =
            MarketEnvConfig::from_lookup(lookup).context("Failed to load market config")?;
        let chart = ChartEnvConfig::from_lookup(lookup).context("Failed to load chart config")?;

        Ok(Self {
            bot,
            market,
            chart,
            indicators: IndicatorSettings::default(),
        })
    }
}

pub(crate) fn parse_or<T>(lookup: EnvLookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .context(format!("Failed to parse {}", key)),
        None => Ok(default),
    }
}
