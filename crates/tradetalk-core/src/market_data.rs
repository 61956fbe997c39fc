//! Market data gateway contract.
//!
//! | Operation | Returns | Failure |
//! |-----------|---------|---------|
//! | [`MarketDataGateway::history`] | [`PriceSeries`] | `DataUnavailable` on zero rows, provider error, bad status, transport failure |
//! | [`MarketDataGateway::current_price`] | latest close | `DataUnavailable` when the one-day window is empty |

use std::future::Future;
use std::pin::Pin;

use crate::{CoreError, HistorySpan, Interval, PriceSeries, ProviderId, Symbol};

/// Boxed future returned by gateway operations.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CoreError>> + Send + 'a>>;

/// Access to historical bars and the latest close for a symbol.
pub trait MarketDataGateway: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Fetches a bounded trailing window of bars. Never returns an empty series.
    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        span: HistorySpan,
        interval: Interval,
    ) -> GatewayFuture<'a, PriceSeries>;

    /// Most recent one-day close.
    fn current_price<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, f64> {
        Box::pin(async move {
            let series = self
                .history(symbol, HistorySpan::ONE_DAY, Interval::OneDay)
                .await?;
            latest_close(&series)
        })
    }
}

/// Last close of a series, or `DataUnavailable` when the provider sent no rows.
pub fn latest_close(series: &PriceSeries) -> Result<f64, CoreError> {
    series
        .last()
        .map(|bar| bar.close)
        .ok_or_else(|| CoreError::data_unavailable(&series.symbol, "provider returned no rows"))
}
