//! Provider adapters behind the gateway traits.

pub mod newsapi;
pub mod yahoo;

pub use newsapi::NewsApiClient;
pub use yahoo::YahooMarketData;
