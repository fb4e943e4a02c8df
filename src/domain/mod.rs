// Owner-only access control
pub mod access;

// Domain-specific error types
pub mod errors;

// Candles, intervals and indicator overlays
pub mod market;

// Port interfaces
pub mod ports;

// Outbound reply model
pub mod reply;
