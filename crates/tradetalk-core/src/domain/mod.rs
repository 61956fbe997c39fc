//! # Domain Models
//!
//! Canonical domain types for tradetalk.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker symbol |
//! | [`Interval`] | Bar interval (1m, 5m, 15m, 1h, 1d) |
//! | [`HistorySpan`] | Trailing history window in calendar days |
//! | [`UtcDateTime`] | UTC timestamp |
//! | [`Bar`] | OHLCV bar with timestamp |
//! | [`PriceSeries`] | Time-ordered bars for a symbol/interval |
//! | [`ForecastPoint`] | Projected (date, price) pair |
//! | [`Article`] | News article |
//! | [`Horizon`] | Forecast horizon (1..=30) |
//! | [`Quantity`] | Interactive share quantity (1..=100) |
//!
//! All types validate their invariants at construction time and return
//! [`ValidationError`](crate::ValidationError) on bad input.

mod interval;
mod models;
mod symbol;
mod timestamp;

pub use interval::{HistorySpan, Interval};
pub use models::{Article, Bar, ForecastPoint, Horizon, PriceSeries, Quantity};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
