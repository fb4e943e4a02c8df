// Command dispatch and owner guard
pub mod commands;

// Bollinger Bands, SMA and RSI over a candle series
pub mod indicators;

pub mod messages;

// Service wiring
pub mod system;
