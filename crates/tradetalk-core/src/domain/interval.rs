use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::ValidationError;

/// Bar sampling interval accepted by the market data gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "1d")]
    OneDay,
}

impl Interval {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::OneDay => "1d",
        }
    }

    pub const fn is_intraday(self) -> bool {
        matches!(self, Self::OneMinute)
    }

    pub fn step(self) -> Duration {
        match self {
            Self::OneMinute => Duration::minutes(1),
            Self::OneDay => Duration::days(1),
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trailing history window measured in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct HistorySpan(u32);

impl HistorySpan {
    /// Window used by the data analysis view.
    pub const TEN_YEARS: Self = Self(3650);
    /// Default window fitted by the prediction flow.
    pub const ONE_YEAR: Self = Self(365);
    /// Window used for "latest close" lookups and intraday predictions.
    pub const ONE_DAY: Self = Self(1);

    pub fn days(days: u32) -> Result<Self, ValidationError> {
        if days == 0 {
            return Err(ValidationError::EmptySpan);
        }
        Ok(Self(days))
    }

    pub const fn as_days(self) -> u32 {
        self.0
    }
}

impl Display for HistorySpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d", self.0)
    }
}

impl TryFrom<u32> for HistorySpan {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::days(value)
    }
}

impl From<HistorySpan> for u32 {
    fn from(value: HistorySpan) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_names_match_yahoo_query_values() {
        assert_eq!(Interval::OneDay.to_string(), "1d");
        assert_eq!(Interval::OneMinute.as_str(), "1m");
        assert!(Interval::OneMinute.is_intraday());
        assert!(!Interval::OneDay.is_intraday());
        assert_eq!(Interval::OneMinute.step(), Duration::minutes(1));
    }

    #[test]
    fn interval_serializes_as_query_value() {
        let json = serde_json::to_string(&Interval::OneMinute).expect("serializes");
        assert_eq!(json, "\"1m\"");
    }

    #[test]
    fn span_must_be_positive() {
        assert_eq!(HistorySpan::days(0), Err(ValidationError::EmptySpan));
        assert_eq!(HistorySpan::days(7).expect("valid").to_string(), "7d");
    }
}
