use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::application::commands::CommandRouter;
use crate::config::Config;
use crate::domain::ports::{ChartRenderer, MarketDataService};
use crate::infrastructure::binance::BinanceMarketDataService;
use crate::infrastructure::chart::PlottersChartRenderer;
use crate::interfaces::telegram;

pub struct Application {
    pub config: Config,
    pub router: Arc<CommandRouter>,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self> {
        info!(
            "Building Bitcoin Pulse ({} {} x {}, owner {})...",
            config.market.symbol,
            config.market.interval,
            config.market.candle_limit,
            config.bot.owner_id
        );

        info!("Using Binance market data ({})", config.market.base_url);
        let market_service: Arc<dyn MarketDataService> =
            Arc::new(BinanceMarketDataService::from_config(&config.market)?);

        let chart_renderer: Arc<dyn ChartRenderer> =
            Arc::new(PlottersChartRenderer::from_config(&config));

        let router = Arc::new(CommandRouter::new(
            &config,
            market_service,
            chart_renderer,
        )?);

        Ok(Self { config, router })
    }

    /// Serves Telegram updates until Ctrl+C.
    pub async fn start(self) -> Result<()> {
        info!("Starting Telegram listener...");
        telegram::run(&self.config, self.router).await
    }
}
