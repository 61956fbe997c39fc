//! News gateway contract.

use time::{Date, Duration};

use crate::market_data::GatewayFuture;
use crate::{Article, ProviderId, Symbol};

/// Days of trailing news requested per lookup.
pub const NEWS_WINDOW_DAYS: i64 = 7;

/// Recent articles mentioning a ticker.
pub trait NewsGateway: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Zero matches is `Ok(vec![])`, never an error.
    fn fetch<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, Vec<Article>>;
}

/// Inclusive `(from, to)` search window ending on `today`.
pub fn news_window(today: Date) -> (Date, Date) {
    let from = today
        .checked_sub(Duration::days(NEWS_WINDOW_DAYS))
        .unwrap_or(Date::MIN);
    (from, today)
}

#[cfg(test)]
mod tests {
    use time::Month;

    use super::*;

    #[test]
    fn window_spans_seven_days_across_month_boundary() {
        let today = Date::from_calendar_date(2024, Month::March, 3).expect("date");
        let (from, to) = news_window(today);
        assert_eq!(from.to_string(), "2024-02-25");
        assert_eq!(to.to_string(), "2024-03-03");
    }
}
