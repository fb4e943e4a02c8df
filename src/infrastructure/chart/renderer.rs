//! Candlestick chart rendering with plotters.
//!
//! Layout, top to bottom:
//! - price panel: candles, Bollinger Bands, SMA
//! - volume bars
//! - RSI with 30/70 guides

use super::fonts::{CHART_FONT_FAMILY, install_chart_font};
use crate::config::Config;
use crate::domain::errors::ChartError;
use crate::domain::market::{AnnotatedSeries, IndicatorColumn, IndicatorSettings};
use crate::domain::ports::ChartRenderer;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::debug;

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const RSI_GUIDE_LEVELS: [f64; 2] = [30.0, 70.0];
const PANEL_MARGIN: i32 = 12;

/// "charles" candle palette with the overlay colors used on the price panel
#[derive(Debug, Clone, Copy)]
pub struct ChartPalette {
    pub up: RGBColor,
    pub down: RGBColor,
    pub band: RGBColor,
    pub band_middle: RGBColor,
    pub sma: RGBColor,
    pub rsi: RGBColor,
    pub guide: RGBColor,
}

impl Default for ChartPalette {
    fn default() -> Self {
        Self {
            up: RGBColor(0x00, 0x63, 0x40),
            down: RGBColor(0xA0, 0x21, 0x28),
            band: RGBColor(173, 216, 230),
            band_middle: RGBColor(128, 128, 128),
            sma: RGBColor(0, 0, 255),
            rsi: RGBColor(128, 0, 128),
            guide: RGBColor(70, 70, 70),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub price_label: String,
    pub volume_label: String,
    pub rsi_label: String,
    /// Titles, axis labels and legend; requires a registered font
    pub text: bool,
}

impl ChartSettings {
    /// Title in the form `BTC/USDT — 24h (1h) | Bollinger + SMA + RSI + Volume`.
    pub fn from_config(config: &Config) -> Self {
        let market = &config.market;
        Self {
            width: config.chart.width,
            height: config.chart.height,
            title: format!(
                "{} — {} ({}) | Bollinger + SMA + RSI + Volume",
                market.pair_label(),
                market.interval.span_label(market.candle_limit),
                market.interval
            ),
            price_label: "Цена, $".to_string(),
            volume_label: "Объём".to_string(),
            rsi_label: "RSI".to_string(),
            text: false,
        }
    }

    pub fn with_text(mut self, text: bool) -> Self {
        self.text = text;
        self
    }
}

pub struct PlottersChartRenderer {
    settings: ChartSettings,
    palette: ChartPalette,
}

impl PlottersChartRenderer {
    pub fn new(settings: ChartSettings) -> Self {
        Self {
            settings,
            palette: ChartPalette::default(),
        }
    }

    /// Registers the chart font (if any is available) and enables text accordingly.
    pub fn from_config(config: &Config) -> Self {
        let text = install_chart_font(config.chart.font_path.as_deref());
        Self::new(ChartSettings::from_config(config).with_text(text))
    }

    fn check_columns(&self, chart: &AnnotatedSeries) -> Result<(), ChartError> {
        let settings = chart.settings();
        for column in IndicatorColumn::ALL {
            if chart.first_defined(column).is_none() {
                return Err(ChartError::MissingIndicator {
                    column: column.label(settings),
                    candles: chart.len(),
                    window: window_of(column, settings),
                });
            }
        }
        Ok(())
    }

    fn label_area(&self, size: u32) -> u32 {
        if self.settings.text { size } else { 0 }
    }

    fn candle_body_width(&self, candles: usize) -> u32 {
        let plot_width = self.settings.width as f64 * 0.85;
        (plot_width / candles as f64 * 0.6).clamp(1.0, 40.0) as u32
    }

    fn draw_price_panel(&self, area: &Panel<'_>, chart: &AnnotatedSeries) -> Result<(), ChartError> {
        let (low, high) = price_bounds(chart);
        let text = self.settings.text;

        let mut builder = ChartBuilder::on(area);
        builder.margin(PANEL_MARGIN).y_label_area_size(self.label_area(90));
        if text {
            builder.caption(&self.settings.title, (CHART_FONT_FAMILY, 30));
        }
        let mut ctx = builder
            .build_cartesian_2d(x_range(chart.len()), low..high)
            .map_err(draw_err)?;

        if text {
            ctx.configure_mesh()
                .disable_x_mesh()
                .y_labels(8)
                .y_desc(self.settings.price_label.as_str())
                .y_label_formatter(&|y| format!("{:.0}", y))
                .draw()
                .map_err(draw_err)?;
        }

        let body = self.candle_body_width(chart.len());
        let (up, down) = (self.palette.up, self.palette.down);
        ctx.draw_series(
            chart
                .series()
                .candles()
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    CandleStick::new(
                        i as f64,
                        c.open,
                        c.high,
                        c.low,
                        c.close,
                        up.filled(),
                        down.filled(),
                        body,
                    )
                }),
        )
        .map_err(draw_err)?;

        let settings = chart.settings();
        let overlays = [
            (
                IndicatorColumn::BollingerLower,
                self.palette.band.stroke_width(2),
                None,
            ),
            (
                IndicatorColumn::BollingerMiddle,
                self.palette.band_middle.mix(0.7).stroke_width(1),
                Some(format!(
                    "BB {} / {:.1}σ",
                    settings.bb_period, settings.bb_multiplier
                )),
            ),
            (
                IndicatorColumn::BollingerUpper,
                self.palette.band.stroke_width(2),
                None,
            ),
            (
                IndicatorColumn::Sma,
                self.palette.sma.stroke_width(2),
                Some(format!("SMA {}", settings.sma_period)),
            ),
        ];

        for (column, style, legend) in overlays {
            let points = chart
                .defined_points(column)
                .into_iter()
                .map(|(i, v)| (i as f64, v));
            let anno = ctx
                .draw_series(LineSeries::new(points, style))
                .map_err(draw_err)?;
            if let (true, Some(label)) = (text, legend) {
                anno.label(label)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], style));
            }
        }

        if text {
            ctx.configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK.mix(0.3))
                .label_font((CHART_FONT_FAMILY, 16))
                .draw()
                .map_err(draw_err)?;
        }

        Ok(())
    }

    fn draw_volume_panel(&self, area: &Panel<'_>, chart: &AnnotatedSeries) -> Result<(), ChartError> {
        let max_volume = chart
            .series()
            .candles()
            .iter()
            .map(|c| c.volume)
            .fold(0.0_f64, f64::max);
        let top = if max_volume > 0.0 { max_volume * 1.1 } else { 1.0 };

        let mut builder = ChartBuilder::on(area);
        builder.margin(PANEL_MARGIN).y_label_area_size(self.label_area(90));
        let mut ctx = builder
            .build_cartesian_2d(x_range(chart.len()), 0.0..top)
            .map_err(draw_err)?;

        if self.settings.text {
            ctx.configure_mesh()
                .disable_x_mesh()
                .y_labels(3)
                .y_desc(self.settings.volume_label.as_str())
                .y_label_formatter(&|v| compact_number(*v))
                .draw()
                .map_err(draw_err)?;
        }

        let (up, down) = (self.palette.up, self.palette.down);
        ctx.draw_series(chart.series().candles().iter().enumerate().map(|(i, c)| {
            let color = if c.close >= c.open { up } else { down };
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, c.volume)], color.mix(0.6).filled())
        }))
        .map_err(draw_err)?;

        Ok(())
    }

    fn draw_rsi_panel(&self, area: &Panel<'_>, chart: &AnnotatedSeries) -> Result<(), ChartError> {
        let candles = chart.series().candles();
        let right = chart.len() as f64 - 0.5;

        let mut builder = ChartBuilder::on(area);
        builder
            .margin(PANEL_MARGIN)
            .y_label_area_size(self.label_area(90))
            .x_label_area_size(self.label_area(40));
        let mut ctx = builder
            .build_cartesian_2d(x_range(chart.len()), 0.0..100.0)
            .map_err(draw_err)?;

        if self.settings.text {
            let time_label = |x: &f64| {
                let idx = x.round();
                if (x - idx).abs() > 1e-6 || idx < 0.0 || idx as usize >= candles.len() {
                    return String::new();
                }
                candles[idx as usize].open_time.format("%d.%m %H:%M").to_string()
            };
            ctx.configure_mesh()
                .disable_x_mesh()
                .x_labels(8)
                .y_labels(5)
                .x_label_formatter(&time_label)
                .y_desc(self.settings.rsi_label.as_str())
                .draw()
                .map_err(draw_err)?;
        }

        for level in RSI_GUIDE_LEVELS {
            ctx.draw_series(LineSeries::new(
                vec![(-0.5, level), (right, level)],
                self.palette.guide.stroke_width(2),
            ))
            .map_err(draw_err)?;
        }

        let points = chart
            .defined_points(IndicatorColumn::Rsi)
            .into_iter()
            .map(|(i, v)| (i as f64, v));
        ctx.draw_series(LineSeries::new(points, self.palette.rsi.stroke_width(2)))
            .map_err(draw_err)?;

        Ok(())
    }
}

impl PlottersChartRenderer {
    fn draw(&self, root: &Panel<'_>, chart: &AnnotatedSeries) -> Result<(), ChartError> {
        root.fill(&WHITE).map_err(draw_err)?;

        let (price_h, volume_h) = panel_heights(self.settings.height);
        let (price_area, lower) = root.split_vertically(price_h);
        let (volume_area, rsi_area) = lower.split_vertically(volume_h);

        self.draw_price_panel(&price_area, chart)?;
        self.draw_volume_panel(&volume_area, chart)?;
        self.draw_rsi_panel(&rsi_area, chart)
    }
}

impl ChartRenderer for PlottersChartRenderer {
    fn render(&self, chart: &AnnotatedSeries, target: &Path) -> Result<(), ChartError> {
        self.check_columns(chart)?;

        let root = BitMapBackend::new(target, (self.settings.width, self.settings.height))
            .into_drawing_area();
        self.draw(&root, chart)?;
        root.present().map_err(draw_err)?;
        debug!(
            "PlottersChartRenderer: rendered {} candles to {}",
            chart.len(),
            target.display()
        );
        Ok(())
    }
}

fn draw_err<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Drawing {
        reason: err.to_string(),
    }
}

/// Price and volume panel heights; RSI takes the rest.
fn panel_heights(height: u32) -> (i32, i32) {
    let height = i64::from(height);
    let share = |percent: i64| i32::try_from(height * percent / 100).unwrap_or(i32::MAX);
    (share(62), share(16))
}

fn window_of(column: IndicatorColumn, settings: &IndicatorSettings) -> usize {
    match column {
        IndicatorColumn::BollingerLower
        | IndicatorColumn::BollingerMiddle
        | IndicatorColumn::BollingerUpper => settings.bb_period,
        IndicatorColumn::Sma => settings.sma_period,
        IndicatorColumn::Rsi => settings.rsi_period,
    }
}

fn x_range(candles: usize) -> std::ops::Range<f64> {
    -0.5..(candles as f64 - 0.5)
}

/// Price axis bounds covering wicks and bands, padded by 5%.
fn price_bounds(chart: &AnnotatedSeries) -> (f64, f64) {
    let mut low = f64::INFINITY;
    let mut high = f64::NEG_INFINITY;
    for (candle, row) in chart.iter() {
        low = low.min(candle.low);
        high = high.max(candle.high);
        for value in [row.bb_lower, row.sma].into_iter().flatten() {
            low = low.min(value);
        }
        for value in [row.bb_upper, row.sma].into_iter().flatten() {
            high = high.max(value);
        }
    }

    let span = high - low;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        low.abs().max(1.0) * 0.01
    };
    (low - pad, high + pad)
}

fn compact_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}
