//! User-facing reply texts.

use crate::domain::errors::CommandError;
use crate::domain::market::Interval;
use rust_decimal::prelude::*;

use super::commands::BotCommand;

pub const ACCESS_DENIED: &str = "❌ Доступ запрещён.";
pub const PRICE_UNAVAILABLE: &str = "❌ Не удалось получить цену.";
pub const CHART_DATA_UNAVAILABLE: &str = "❌ Не удалось загрузить данные.";
pub const CHART_RENDER_FAILED: &str = "❌ Не удалось построить график.";

pub fn welcome() -> String {
    "🚀 Bitcoin Pulse активирован!\nВыберите команду:".to_string()
}

pub fn menu_keyboard() -> Vec<Vec<String>> {
    vec![
        vec!["/price".to_string(), "/chart".to_string()],
        vec!["/help".to_string()],
    ]
}

pub fn help(asset: &str) -> String {
    format!(
        "📚 Команды:\n\
         /price — текущая цена {}\n\
         /chart — график: свечи, Bollinger, SMA, RSI, объёмы\n\
         /help — это меню",
        asset
    )
}

pub fn price_quote(asset: &str, price: f64) -> String {
    format!("📊 Текущая цена {}: ${}", asset, format_usd(price))
}

pub fn chart_progress(count: usize, interval: Interval) -> String {
    format!(
        "⏳ Строю график... ({} {}, {})",
        count,
        candle_noun(count),
        interval
    )
}

/// Reply text for a failed command.
pub fn failure_text(command: BotCommand, error: &CommandError) -> &'static str {
    match (command, error) {
        (_, CommandError::Unauthorized { .. }) => ACCESS_DENIED,
        (BotCommand::Price, _) => PRICE_UNAVAILABLE,
        (_, CommandError::DataUnavailable(_)) => CHART_DATA_UNAVAILABLE,
        (_, CommandError::RenderFailed(_)) => CHART_RENDER_FAILED,
    }
}

/// Two decimals with comma thousands separators, e.g. `67,890.12`.
pub fn format_usd(value: f64) -> String {
    let fixed = match Decimal::from_f64_retain(value) {
        Some(d) => format!(
            "{:.2}",
            d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        ),
        None => format!("{:.2}", value),
    };

    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let digits = int_part.len();
    let mut grouped = String::with_capacity(digits + digits / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{}", sign, grouped, frac_part)
}

fn candle_noun(count: usize) -> &'static str {
    match (count % 10, count % 100) {
        (1, n) if n != 11 => "свеча",
        (2..=4, n) if !(12..=14).contains(&n) => "свечи",
        _ => "свечей",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{ChartError, MarketDataError};

    #[test]
    fn test_price_quote_matches_expected_text() {
        assert_eq!(price_quote("BTC", 67890.12), "📊 Текущая цена BTC: $67,890.12");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(67890.12), "67,890.12");
        assert_eq!(format_usd(50000.0), "50,000.00");
        assert_eq!(format_usd(999.999), "1,000.00");
        assert_eq!(format_usd(1234567.891), "1,234,567.89");
        assert_eq!(format_usd(0.5), "0.50");
        assert_eq!(format_usd(-1500.25), "-1,500.25");
    }

    #[test]
    fn test_chart_progress_plurals() {
        assert_eq!(
            chart_progress(24, Interval::OneHour),
            "⏳ Строю график... (24 свечи, 1h)"
        );
        assert_eq!(
            chart_progress(21, Interval::FifteenMin),
            "⏳ Строю график... (21 свеча, 15m)"
        );
        assert_eq!(
            chart_progress(100, Interval::OneDay),
            "⏳ Строю график... (100 свечей, 1d)"
        );
        assert_eq!(candle_noun(11), "свечей");
        assert_eq!(candle_noun(12), "свечей");
    }

    #[test]
    fn test_failure_text_per_command() {
        let unauthorized = CommandError::Unauthorized { requester: Some(7) };
        let no_data = CommandError::DataUnavailable(MarketDataError::Empty {
            symbol: "BTCUSDT".to_string(),
        });
        let no_chart = CommandError::RenderFailed(ChartError::Drawing {
            reason: "backend".to_string(),
        });

        assert_eq!(failure_text(BotCommand::Chart, &unauthorized), ACCESS_DENIED);
        assert_eq!(failure_text(BotCommand::Price, &no_data), PRICE_UNAVAILABLE);
        assert_eq!(failure_text(BotCommand::Chart, &no_data), CHART_DATA_UNAVAILABLE);
        assert_eq!(failure_text(BotCommand::Chart, &no_chart), CHART_RENDER_FAILED);
    }

    #[test]
    fn test_menu_and_help() {
        assert_eq!(menu_keyboard(), vec![vec!["/price", "/chart"], vec!["/help"]]);
        let text = help("BTC");
        assert!(text.contains("/price — текущая цена BTC"));
        assert!(text.contains("/chart"));
        assert!(text.contains("/help"));
    }
}
