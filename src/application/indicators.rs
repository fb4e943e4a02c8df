use crate::domain::errors::IndicatorError;
use crate::domain::market::{AnnotatedSeries, CandleSeries, IndicatorRow, IndicatorSettings};
use std::fmt::Debug;
use ta::Next;
use ta::indicators::{BollingerBands, RelativeStrengthIndex, SimpleMovingAverage};

/// Computes Bollinger Bands, SMA and RSI over candle closes.
///
/// The `ta` indicators emit a value from the very first input; rows before a
/// window has filled are masked to `None` here so the overlay only carries
/// full-window values.
///
/// RSI uses Wilder smoothing (alpha = 1/n). `ta` smooths with an EMA of
/// k = 2/(p+1), so the indicator is built with p = 2n - 1.
#[derive(Debug, Clone)]
pub struct IndicatorCalculator {
    settings: IndicatorSettings,
    bb: BollingerBands,
    sma: SimpleMovingAverage,
    rsi: RelativeStrengthIndex,
}

impl IndicatorCalculator {
    pub fn new(settings: IndicatorSettings) -> Result<Self, IndicatorError> {
        if !settings.bb_multiplier.is_finite() || settings.bb_multiplier <= 0.0 {
            return Err(IndicatorError::InvalidParameters {
                reason: format!(
                    "Bollinger multiplier must be positive, got {}",
                    settings.bb_multiplier
                ),
            });
        }

        Ok(Self {
            settings,
            bb: BollingerBands::new(settings.bb_period, settings.bb_multiplier)
                .map_err(|e| invalid("Bollinger Bands", settings.bb_period, e))?,
            sma: SimpleMovingAverage::new(settings.sma_period)
                .map_err(|e| invalid("SMA", settings.sma_period, e))?,
            rsi: RelativeStrengthIndex::new(wilder_ema_period(settings.rsi_period))
                .map_err(|e| invalid("RSI", settings.rsi_period, e))?,
        })
    }

    /// Annotates `series` with one indicator row per candle.
    pub fn annotate(&self, series: CandleSeries) -> AnnotatedSeries {
        // Fresh state per request
        let mut bb = self.bb.clone();
        let mut sma = self.sma.clone();
        let mut rsi = self.rsi.clone();

        let rows = series
            .closes()
            .enumerate()
            .map(|(i, close)| {
                let filled = i + 1;
                let bands = bb.next(close);
                let average = sma.next(close);
                let strength = rsi.next(close);

                let bb_ready = filled >= self.settings.bb_period;
                IndicatorRow {
                    bb_lower: bb_ready.then_some(bands.lower),
                    bb_middle: bb_ready.then_some(bands.average),
                    bb_upper: bb_ready.then_some(bands.upper),
                    sma: (filled >= self.settings.sma_period).then_some(average),
                    rsi: (filled >= self.settings.rsi_period).then_some(strength),
                }
            })
            .collect();

        AnnotatedSeries::new(series, rows, self.settings)
    }
}

/// EMA period whose smoothing factor equals Wilder's 1/`period`.
fn wilder_ema_period(period: usize) -> usize {
    (2 * period).saturating_sub(1)
}

fn invalid<E: Debug>(indicator: &str, period: usize, err: E) -> IndicatorError {
    IndicatorError::InvalidParameters {
        reason: format!("{} period {}: {:?}", indicator, period, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{Candle, IndicatorColumn};
    use chrono::{Duration, TimeZone, Utc};

    fn series_from_closes(closes: &[f64]) -> CandleSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                open_time: start + Duration::hours(i as i64),
                open: close,
                high: close + 5.0,
                low: close - 5.0,
                close,
                volume: 10.0,
            })
            .collect();
        CandleSeries::new("BTCUSDT", candles).unwrap()
    }

    fn calculator() -> IndicatorCalculator {
        IndicatorCalculator::new(IndicatorSettings::default()).unwrap()
    }

    #[test]
    fn test_window_warmup_rows_are_undefined() {
        let closes: Vec<f64> = (0..24).map(|i| 60_000.0 + (i * 37 % 11) as f64 * 25.0).collect();
        let annotated = calculator().annotate(series_from_closes(&closes));

        assert_eq!(annotated.len(), 24);
        assert_eq!(annotated.series().len(), 24);

        for (i, row) in annotated.rows().iter().enumerate() {
            let bb_defined = i >= 19;
            assert_eq!(row.bb_lower.is_some(), bb_defined, "bb_lower row {}", i);
            assert_eq!(row.bb_middle.is_some(), bb_defined, "bb_middle row {}", i);
            assert_eq!(row.bb_upper.is_some(), bb_defined, "bb_upper row {}", i);
            assert_eq!(row.sma.is_some(), bb_defined, "sma row {}", i);
            assert_eq!(row.rsi.is_some(), i >= 13, "rsi row {}", i);
        }

        assert_eq!(annotated.first_defined(IndicatorColumn::Sma), Some(19));
        assert_eq!(annotated.first_defined(IndicatorColumn::Rsi), Some(13));
    }

    #[test]
    fn test_constant_close_has_zero_width_bands() {
        let annotated = calculator().annotate(series_from_closes(&[50_000.0; 24]));

        for row in annotated.rows().iter().skip(19) {
            let sma = row.sma.unwrap();
            let lower = row.bb_lower.unwrap();
            let middle = row.bb_middle.unwrap();
            let upper = row.bb_upper.unwrap();
            assert!((sma - 50_000.0).abs() < 1e-9);
            assert!((middle - 50_000.0).abs() < 1e-9);
            assert!((upper - lower).abs() < 1e-9);
            assert!((upper - middle).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sma_matches_arithmetic_mean() {
        let closes: Vec<f64> = (1..=24).map(|i| i as f64 * 100.0).collect();
        let annotated = calculator().annotate(series_from_closes(&closes));

        let last = annotated.rows()[23];
        let expected: f64 = closes[4..24].iter().sum::<f64>() / 20.0;
        assert!((last.sma.unwrap() - expected).abs() < 1e-6);
        assert!((last.bb_middle.unwrap() - expected).abs() < 1e-6);
        assert!(last.bb_upper.unwrap() > expected && last.bb_lower.unwrap() < expected);
    }

    #[test]
    fn test_rsi_stays_in_range() {
        let closes: Vec<f64> = (0..24)
            .map(|i| 60_000.0 + if i % 2 == 0 { 150.0 } else { -90.0 } * i as f64)
            .collect();
        let annotated = calculator().annotate(series_from_closes(&closes));

        for (_, rsi) in annotated.defined_points(IndicatorColumn::Rsi) {
            assert!((0.0..=100.0).contains(&rsi), "rsi out of range: {}", rsi);
        }
    }

    /// Wilder RSI as an adjusted exponential average of gains and losses, alpha = 1/period.
    fn wilder_rsi(closes: &[f64], period: usize, row: usize) -> f64 {
        let alpha = 1.0 / period as f64;
        let (mut gain, mut loss, mut weight) = (0.0, 0.0, 0.0);
        for i in 1..=row {
            let w = (1.0 - alpha).powi((row - i) as i32);
            let delta = closes[i] - closes[i - 1];
            gain += w * delta.max(0.0);
            loss += w * (-delta).max(0.0);
            weight += w;
        }
        let (gain, loss) = (gain / weight, loss / weight);
        100.0 * gain / (gain + loss)
    }

    #[test]
    fn test_rsi_uses_wilder_smoothing() {
        let closes: Vec<f64> = (0..24)
            .map(|i| 60_000.0 + (i as f64 * 0.9).sin() * 400.0 + i as f64 * 30.0)
            .collect();
        let annotated = calculator().annotate(series_from_closes(&closes));
        let rows = annotated.rows();

        assert!((rows[18].rsi.unwrap() - 51.64).abs() < 0.05);
        assert!((rows[23].rsi.unwrap() - 64.05).abs() < 0.05);

        for row in 13..24 {
            let expected = wilder_rsi(&closes, 14, row);
            let actual = rows[row].rsi.unwrap();
            assert!(
                (actual - expected).abs() < 0.05,
                "row {}: rsi {} vs wilder {}",
                row,
                actual,
                expected
            );
        }
    }

    #[test]
    fn test_wilder_ema_period() {
        assert_eq!(wilder_ema_period(14), 27);
        assert_eq!(wilder_ema_period(1), 1);
        assert_eq!(wilder_ema_period(0), 0);
    }

    #[test]
    fn test_short_series_leaves_columns_undefined() {
        let annotated = calculator().annotate(series_from_closes(&[61_000.0; 10]));

        assert_eq!(annotated.len(), 10);
        assert!(annotated.first_defined(IndicatorColumn::BollingerLower).is_none());
        assert!(annotated.first_defined(IndicatorColumn::Sma).is_none());
        assert!(annotated.first_defined(IndicatorColumn::Rsi).is_none());
    }

    #[test]
    fn test_single_candle_does_not_panic() {
        let annotated = calculator().annotate(series_from_closes(&[42_000.0]));
        assert_eq!(annotated.rows(), &[IndicatorRow::default()]);
    }

    #[test]
    fn test_annotate_is_repeatable() {
        let calc = calculator();
        let closes: Vec<f64> = (0..24).map(|i| 60_000.0 + i as f64 * 13.0).collect();
        let first = calc.annotate(series_from_closes(&closes));
        let second = calc.annotate(series_from_closes(&closes));
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let zero_period = IndicatorSettings {
            sma_period: 0,
            ..IndicatorSettings::default()
        };
        assert!(IndicatorCalculator::new(zero_period).is_err());

        let bad_multiplier = IndicatorSettings {
            bb_multiplier: f64::NAN,
            ..IndicatorSettings::default()
        };
        assert!(IndicatorCalculator::new(bad_multiplier).is_err());
    }
}
