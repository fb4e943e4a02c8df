//! Indicator overlay types derived from a [`CandleSeries`].

use super::candle::{Candle, CandleSeries};

/// Window lengths and multipliers used by the indicator calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSettings {
    pub bb_period: usize,
    pub bb_multiplier: f64,
    pub sma_period: usize,
    pub rsi_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            bb_period: 20,
            bb_multiplier: 2.0,
            sma_period: 20,
            rsi_period: 14,
        }
    }
}

impl IndicatorSettings {
    /// Longest rolling window; a series shorter than this leaves at least one column empty.
    pub fn longest_window(&self) -> usize {
        self.bb_period.max(self.sma_period).max(self.rsi_period)
    }
}

/// Indicator values aligned with one candle. `None` while the window is filling.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorRow {
    pub bb_lower: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_upper: Option<f64>,
    pub sma: Option<f64>,
    pub rsi: Option<f64>,
}

/// Named columns of the overlay, used for lookups and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorColumn {
    BollingerLower,
    BollingerMiddle,
    BollingerUpper,
    Sma,
    Rsi,
}

impl IndicatorColumn {
    pub const ALL: [IndicatorColumn; 5] = [
        IndicatorColumn::BollingerLower,
        IndicatorColumn::BollingerMiddle,
        IndicatorColumn::BollingerUpper,
        IndicatorColumn::Sma,
        IndicatorColumn::Rsi,
    ];

    pub fn pick(&self, row: &IndicatorRow) -> Option<f64> {
        match self {
            IndicatorColumn::BollingerLower => row.bb_lower,
            IndicatorColumn::BollingerMiddle => row.bb_middle,
            IndicatorColumn::BollingerUpper => row.bb_upper,
            IndicatorColumn::Sma => row.sma,
            IndicatorColumn::Rsi => row.rsi,
        }
    }

    /// Column label in the `BBL_20_2.0` / `SMA_20` / `RSI_14` convention.
    pub fn label(&self, settings: &IndicatorSettings) -> String {
        match self {
            IndicatorColumn::BollingerLower => {
                format!("BBL_{}_{:.1}", settings.bb_period, settings.bb_multiplier)
            }
            IndicatorColumn::BollingerMiddle => {
                format!("BBM_{}_{:.1}", settings.bb_period, settings.bb_multiplier)
            }
            IndicatorColumn::BollingerUpper => {
                format!("BBU_{}_{:.1}", settings.bb_period, settings.bb_multiplier)
            }
            IndicatorColumn::Sma => format!("SMA_{}", settings.sma_period),
            IndicatorColumn::Rsi => format!("RSI_{}", settings.rsi_period),
        }
    }
}

/// A candle series together with its indicator rows; both have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSeries {
    series: CandleSeries,
    rows: Vec<IndicatorRow>,
    settings: IndicatorSettings,
}

impl AnnotatedSeries {
    pub(crate) fn new(
        series: CandleSeries,
        rows: Vec<IndicatorRow>,
        settings: IndicatorSettings,
    ) -> Self {
        debug_assert_eq!(series.len(), rows.len());
        Self {
            series,
            rows,
            settings,
        }
    }

    pub fn series(&self) -> &CandleSeries {
        &self.series
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Candle, &IndicatorRow)> + '_ {
        self.series.candles().iter().zip(self.rows.iter())
    }

    /// Index/value pairs of one column, skipping undefined rows.
    pub fn defined_points(&self, column: IndicatorColumn) -> Vec<(usize, f64)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| column.pick(row).map(|v| (i, v)))
            .collect()
    }

    /// Index of the first row where `column` is defined.
    pub fn first_defined(&self, column: IndicatorColumn) -> Option<usize> {
        self.rows.iter().position(|row| column.pick(row).is_some())
    }
}
