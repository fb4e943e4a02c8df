use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

/// Candle granularities accepted by the Binance klines endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    OneMin,
    ThreeMin,
    FiveMin,
    FifteenMin,
    ThirtyMin,
    OneHour,
    TwoHour,
    FourHour,
    SixHour,
    EightHour,
    TwelveHour,
    OneDay,
    ThreeDay,
    OneWeek,
}

impl Interval {
    /// Returns the duration of one candle in minutes
    pub fn to_minutes(&self) -> u64 {
        match self {
            Interval::OneMin => 1,
            Interval::ThreeMin => 3,
            Interval::FiveMin => 5,
            Interval::FifteenMin => 15,
            Interval::ThirtyMin => 30,
            Interval::OneHour => 60,
            Interval::TwoHour => 120,
            Interval::FourHour => 240,
            Interval::SixHour => 360,
            Interval::EightHour => 480,
            Interval::TwelveHour => 720,
            Interval::OneDay => 1440,
            Interval::ThreeDay => 4320,
            Interval::OneWeek => 10080,
        }
    }

    /// Converts to Binance API interval string
    pub fn to_binance_string(&self) -> &'static str {
        match self {
            Interval::OneMin => "1m",
            Interval::ThreeMin => "3m",
            Interval::FiveMin => "5m",
            Interval::FifteenMin => "15m",
            Interval::ThirtyMin => "30m",
            Interval::OneHour => "1h",
            Interval::TwoHour => "2h",
            Interval::FourHour => "4h",
            Interval::SixHour => "6h",
            Interval::EightHour => "8h",
            Interval::TwelveHour => "12h",
            Interval::OneDay => "1d",
            Interval::ThreeDay => "3d",
            Interval::OneWeek => "1w",
        }
    }

    /// Human label for the time covered by `count` candles, e.g. `24h` for 24 x 1h.
    pub fn span_label(&self, count: usize) -> String {
        let minutes = self.to_minutes() * count as u64;
        // A single day of intraday candles reads as 24h
        let whole_days = minutes % 1440 == 0 && (minutes > 1440 || self.to_minutes() >= 1440);
        if whole_days {
            format!("{}d", minutes / 1440)
        } else if minutes % 60 == 0 {
            format!("{}h", minutes / 60)
        } else {
            format!("{}m", minutes)
        }
    }
}

impl FromStr for Interval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        // "1M" (month) is case-sensitive on Binance and deliberately unsupported
        match s.trim() {
            "1m" => Ok(Interval::OneMin),
            "3m" => Ok(Interval::ThreeMin),
            "5m" => Ok(Interval::FiveMin),
            "15m" => Ok(Interval::FifteenMin),
            "30m" => Ok(Interval::ThirtyMin),
            "1h" | "1H" => Ok(Interval::OneHour),
            "2h" | "2H" => Ok(Interval::TwoHour),
            "4h" | "4H" => Ok(Interval::FourHour),
            "6h" | "6H" => Ok(Interval::SixHour),
            "8h" | "8H" => Ok(Interval::EightHour),
            "12h" | "12H" => Ok(Interval::TwelveHour),
            "1d" | "1D" => Ok(Interval::OneDay),
            "3d" | "3D" => Ok(Interval::ThreeDay),
            "1w" | "1W" => Ok(Interval::OneWeek),
            _ => Err(anyhow!(
                "Invalid interval: '{}'. Valid options: 1m, 3m, 5m, 15m, 30m, 1h, 2h, 4h, 6h, 8h, 12h, 1d, 3d, 1w",
                s
            )),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_binance_string())
    }
}
