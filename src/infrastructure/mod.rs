pub mod binance;
pub mod chart;
pub mod core;
pub mod mock;

pub use binance::BinanceMarketDataService;
pub use chart::{ChartFile, PlottersChartRenderer};
