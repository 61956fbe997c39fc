use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Symbol;

/// Validation errors for user input and domain primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter, digit or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("history span must be at least one day")]
    EmptySpan,

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("timestamp is out of the representable range")]
    TimestampOutOfRange,

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("bar high must be >= low")]
    InvalidBarRange,
    #[error("bar open/close must be within high/low range")]
    InvalidBarBounds,

    #[error("horizon {value} is out of range {min}..={max}")]
    HorizonOutOfRange { value: i64, min: u32, max: u32 },
    #[error("quantity must be greater than zero")]
    ZeroQuantity,
    #[error("quantity {value} is out of range {min}..={max}")]
    QuantityOutOfRange { value: i64, min: u64, max: u64 },
    #[error("holding quantity overflow")]
    QuantityOverflow,
    #[error("no company in the directory matches '{query}'")]
    UnknownCompany { query: String },
    #[error("'{query}' matches {matches} companies; be more specific")]
    AmbiguousCompany { query: String, matches: usize },
    #[error("moving-average order q={q} is not supported")]
    UnsupportedMovingAverage { q: usize },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
}

/// Failure classes surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    DataUnavailable,
    ForecastFailed,
    NewsUnavailable,
    InsufficientShares,
    UnknownHolding,
    #[serde(rename = "configuration_error")]
    Configuration,
    #[serde(rename = "serialization_error")]
    Serialization,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::DataUnavailable => "data_unavailable",
            Self::ForecastFailed => "forecast_failed",
            Self::NewsUnavailable => "news_unavailable",
            Self::InsufficientShares => "insufficient_shares",
            Self::UnknownHolding => "unknown_holding",
            Self::Configuration => "configuration_error",
            Self::Serialization => "serialization_error",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("forecast failed: {0}")]
    ForecastFailed(String),

    #[error("news unavailable: {0}")]
    NewsUnavailable(String),

    #[error("not enough shares of {symbol} to sell: holding {held}, requested {requested}")]
    InsufficientShares {
        symbol: String,
        held: u64,
        requested: u64,
    },

    #[error("you do not own {symbol} in your portfolio")]
    UnknownHolding { symbol: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    pub fn data_unavailable(symbol: &Symbol, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.as_str().to_owned(),
            reason: reason.into(),
        }
    }

    pub fn forecast_failed(reason: impl Into<String>) -> Self {
        Self::ForecastFailed(reason.into())
    }

    pub fn news_unavailable(reason: impl Into<String>) -> Self {
        Self::NewsUnavailable(reason.into())
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration(reason.into())
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::InvalidInput,
            Self::DataUnavailable { .. } => ErrorKind::DataUnavailable,
            Self::ForecastFailed(_) => ErrorKind::ForecastFailed,
            Self::NewsUnavailable(_) => ErrorKind::NewsUnavailable,
            Self::InsufficientShares { .. } => ErrorKind::InsufficientShares,
            Self::UnknownHolding { .. } => ErrorKind::UnknownHolding,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        let symbol = Symbol::parse("AAPL").expect("valid symbol");
        assert_eq!(
            CoreError::data_unavailable(&symbol, "no rows").kind(),
            ErrorKind::DataUnavailable
        );
        assert_eq!(
            CoreError::from(ValidationError::ZeroQuantity).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(ErrorKind::Configuration.as_str(), "configuration_error");
    }

    #[test]
    fn data_unavailable_message_names_symbol() {
        let symbol = Symbol::parse("nope").expect("valid symbol");
        let message = CoreError::data_unavailable(&symbol, "provider returned no rows").to_string();
        assert_eq!(message, "data unavailable for NOPE: provider returned no rows");
    }
}
