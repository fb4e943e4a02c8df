//! Command Router
//!
//! Owner-guarded dispatch of the bot commands:
//! - `/start` and `/help`: static texts
//! - `/price`: one fetch, last close as a quote
//! - `/chart`: fetch, annotate, render off the reactor, send the PNG

use super::indicators::IndicatorCalculator;
use super::messages;
use crate::config::Config;
use crate::domain::access::{AccessGuard, RequesterId};
use crate::domain::errors::{ChartError, CommandError};
use crate::domain::market::{CandleSeries, Interval};
use crate::domain::ports::{ChartRenderer, MarketDataService, ReplySink};
use crate::domain::reply::Reply;
use crate::infrastructure::chart::ChartFile;
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotCommand {
    Start,
    Price,
    Chart,
    Help,
}

impl BotCommand {
    pub const ALL: [BotCommand; 4] = [
        BotCommand::Start,
        BotCommand::Price,
        BotCommand::Chart,
        BotCommand::Help,
    ];
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BotCommand::Start => "/start",
            BotCommand::Price => "/price",
            BotCommand::Chart => "/chart",
            BotCommand::Help => "/help",
        };
        write!(f, "{}", name)
    }
}

pub struct CommandRouter {
    guard: AccessGuard,
    market: Arc<dyn MarketDataService>,
    renderer: Arc<dyn ChartRenderer>,
    calculator: IndicatorCalculator,
    symbol: String,
    asset: String,
    interval: Interval,
    candle_limit: usize,
    chart_dir: PathBuf,
}

impl CommandRouter {
    pub fn new(
        config: &Config,
        market: Arc<dyn MarketDataService>,
        renderer: Arc<dyn ChartRenderer>,
    ) -> Result<Self> {
        let calculator = IndicatorCalculator::new(config.indicators)?;

        Ok(Self {
            guard: AccessGuard::new(config.bot.owner_id),
            market,
            renderer,
            calculator,
            symbol: config.market.symbol.clone(),
            asset: config.market.asset_label().to_string(),
            interval: config.market.interval,
            candle_limit: config.market.candle_limit,
            chart_dir: config.chart.output_dir.clone(),
        })
    }

    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    /// Authorizes and runs `command`, replying through `sink`.
    ///
    /// Never fails: command errors become a reply, delivery errors are logged.
    pub async fn handle(
        &self,
        requester: Option<RequesterId>,
        command: BotCommand,
        sink: &dyn ReplySink,
    ) {
        let started = Instant::now();

        let outcome = match self.guard.authorize(requester) {
            Ok(owner) => {
                info!("CommandRouter: {} from owner {}", command, owner);
                self.execute(command, sink).await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => info!(
                "CommandRouter: {} completed in {}ms",
                command,
                started.elapsed().as_millis()
            ),
            Err(e) => {
                match &e {
                    CommandError::Unauthorized { .. } => {
                        warn!("CommandRouter: {} rejected: {}", command, e)
                    }
                    _ => error!("CommandRouter: {} failed: {}", command, e),
                }
                Self::send(sink, Reply::text(messages::failure_text(command, &e))).await;
            }
        }
    }

    async fn execute(&self, command: BotCommand, sink: &dyn ReplySink) -> Result<(), CommandError> {
        match command {
            BotCommand::Start => {
                Self::send(
                    sink,
                    Reply::Menu {
                        text: messages::welcome(),
                        keyboard: messages::menu_keyboard(),
                    },
                )
                .await;
            }
            BotCommand::Help => {
                Self::send(sink, Reply::text(messages::help(&self.asset))).await;
            }
            BotCommand::Price => {
                let series = self.fetch().await?;
                let quote = messages::price_quote(&self.asset, series.last_close());
                Self::send(sink, Reply::text(quote)).await;
            }
            BotCommand::Chart => self.chart(sink).await?,
        }
        Ok(())
    }

    async fn chart(&self, sink: &dyn ReplySink) -> Result<(), CommandError> {
        Self::send(
            sink,
            Reply::text(messages::chart_progress(self.candle_limit, self.interval)),
        )
        .await;

        let series = self.fetch().await?;
        info!(
            "CommandRouter: charting {} candles {} .. {}",
            series.len(),
            series.first_open_time().format("%Y-%m-%d %H:%M"),
            series.last_open_time().format("%Y-%m-%d %H:%M")
        );
        let annotated = self.calculator.annotate(series);

        // Removed when this scope ends, whichever way it ends
        let file = ChartFile::allocate(&self.chart_dir);
        let target = file.path().to_path_buf();
        let renderer = Arc::clone(&self.renderer);

        tokio::task::spawn_blocking(move || renderer.render(&annotated, &target))
            .await
            .map_err(|e| ChartError::Task {
                reason: e.to_string(),
            })??;

        Self::send(
            sink,
            Reply::Photo {
                path: file.path().to_path_buf(),
            },
        )
        .await;

        Ok(())
    }

    async fn fetch(&self) -> Result<CandleSeries, CommandError> {
        Ok(self
            .market
            .get_candles(&self.symbol, self.interval, self.candle_limit)
            .await?)
    }

    async fn send(sink: &dyn ReplySink, reply: Reply) {
        if let Err(e) = sink.deliver(reply).await {
            error!("CommandRouter: failed to deliver reply: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::MarketDataError;
    use crate::infrastructure::mock::{MockMarketDataService, RecordingReplySink};
    use std::path::Path;

    struct NeverRenderer;

    impl ChartRenderer for NeverRenderer {
        fn render(
            &self,
            _chart: &crate::domain::market::AnnotatedSeries,
            _target: &Path,
        ) -> Result<(), ChartError> {
            panic!("renderer must not be called");
        }
    }

    fn config() -> Config {
        let lookup = |key: &str| match key {
            "TELEGRAM_TOKEN" => Some("123:abc".to_string()),
            "OWNER_ID" => Some("42".to_string()),
            _ => None,
        };
        Config::from_lookup(&lookup).unwrap()
    }

    #[test]
    fn test_command_display() {
        let names: Vec<String> = BotCommand::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["/start", "/price", "/chart", "/help"]);
    }

    #[tokio::test]
    async fn test_stranger_gets_rejection_without_fetch() {
        let market = Arc::new(MockMarketDataService::failing(MarketDataError::Empty {
            symbol: "BTCUSDT".to_string(),
        }));
        let router = CommandRouter::new(&config(), market.clone(), Arc::new(NeverRenderer)).unwrap();
        let sink = RecordingReplySink::new();

        router
            .handle(Some(RequesterId(7)), BotCommand::Chart, &sink)
            .await;

        assert_eq!(market.calls(), 0);
        assert_eq!(sink.texts().await, vec![messages::ACCESS_DENIED.to_string()]);
    }

    #[tokio::test]
    async fn test_chart_fetch_failure_skips_render() {
        let market = Arc::new(MockMarketDataService::failing(MarketDataError::Transport {
            endpoint: "http://localhost".to_string(),
            reason: "connection refused".to_string(),
        }));
        let router = CommandRouter::new(&config(), market.clone(), Arc::new(NeverRenderer)).unwrap();
        let sink = RecordingReplySink::new();

        router.handle(Some(RequesterId(42)), BotCommand::Chart, &sink).await;

        assert_eq!(market.calls(), 1);
        let texts = sink.texts().await;
        assert_eq!(texts.len(), 2);
        assert!(texts[0].starts_with("⏳"));
        assert_eq!(texts[1], messages::CHART_DATA_UNAVAILABLE);
    }
}
