//! Core library for tradetalk.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - Configuration and the ticker directory
//! - Market data and news gateways with their provider adapters
//! - ARIMA forecasting, the portfolio simulator and report view models
//! - Response envelope and structured errors

pub mod adapters;
pub mod config;
pub mod directory;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod forecast;
pub mod http_client;
pub mod market_data;
pub mod news;
pub mod portfolio;
pub mod report;
pub mod source;

pub use adapters::{NewsApiClient, YahooMarketData};
pub use config::{AppConfig, DirectoryConfig};
pub use directory::TickerDirectory;
pub use domain::{
    Article, Bar, ForecastPoint, HistorySpan, Horizon, Interval, PriceSeries, Quantity, Symbol,
    UtcDateTime,
};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};
pub use error::{CoreError, ErrorKind, ValidationError};
pub use forecast::{ArimaOrder, Forecast, ForecastEngine};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use market_data::MarketDataGateway;
pub use news::NewsGateway;
pub use portfolio::{Holdings, Valuation, ValuationLine};
pub use source::ProviderId;
