use std::sync::Arc;

use serde::Deserialize;
use time::{Duration, Weekday};

use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient, DEFAULT_TIMEOUT_MS};
use crate::market_data::{GatewayFuture, MarketDataGateway};
use crate::{
    AppConfig, Bar, CoreError, HistorySpan, Interval, PriceSeries, ProviderId, Symbol,
    UtcDateTime,
};

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const REFERER: &str = "https://finance.yahoo.com/";

/// Upper bound on synthesized bars in mock mode (ten years of sessions).
const MAX_FAKE_BARS: usize = 2_600;
/// Regular US session length in minutes.
const SESSION_MINUTES: i64 = 390;

/// Yahoo Finance chart adapter supporting both real API calls and mock mode.
#[derive(Clone)]
pub struct YahooMarketData {
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
    use_real_api: bool,
}

impl Default for YahooMarketData {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            use_real_api: false,
        }
    }
}

impl YahooMarketData {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let is_real = !http_client.is_mock();
        Self {
            http_client,
            use_real_api: is_real,
            ..Self::default()
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_http_client(config.http_client()).with_timeout_ms(config.timeout_ms())
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn is_real_client(&self) -> bool {
        self.use_real_api
    }
}

impl MarketDataGateway for YahooMarketData {
    fn id(&self) -> ProviderId {
        if self.is_real_client() {
            ProviderId::Yahoo
        } else {
            ProviderId::Mock
        }
    }

    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        span: HistorySpan,
        interval: Interval,
    ) -> GatewayFuture<'a, PriceSeries> {
        Box::pin(async move {
            let series = if self.is_real_client() {
                self.fetch_real_history(symbol, span, interval).await?
            } else {
                fake_history(symbol, span, interval)?
            };

            if series.is_empty() {
                return Err(CoreError::data_unavailable(
                    symbol,
                    "provider returned no rows",
                ));
            }

            tracing::debug!(
                symbol = %symbol,
                span = %span,
                interval = %interval,
                rows = series.len(),
                "history fetched"
            );
            Ok(series)
        })
    }
}

// Real API implementation methods
impl YahooMarketData {
    async fn fetch_real_history(
        &self,
        symbol: &Symbol,
        span: HistorySpan,
        interval: Interval,
    ) -> Result<PriceSeries, CoreError> {
        let endpoint = chart_url(symbol, span, interval);
        tracing::debug!(url = %endpoint, "requesting yahoo chart");

        let request = HttpRequest::get(&endpoint)
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|e| {
            let reason = if e.timed_out() {
                format!("yahoo request timed out after {} ms", self.timeout_ms)
            } else {
                format!("yahoo transport error: {}", e.message())
            };
            CoreError::data_unavailable(symbol, reason)
        })?;

        // Yahoo reports unknown symbols as a 404 with a structured error body
        let parsed = serde_json::from_str::<YahooChartResponse>(&response.body);
        if let Ok(chart) = &parsed {
            if let Some(error) = &chart.chart.error {
                return Err(CoreError::data_unavailable(symbol, error.describe()));
            }
        }

        if !response.is_success() {
            return Err(CoreError::data_unavailable(
                symbol,
                format!("yahoo returned status {}", response.status),
            ));
        }

        let chart = parsed.map_err(|e| {
            CoreError::data_unavailable(symbol, format!("failed to parse yahoo chart: {e}"))
        })?;

        parse_chart(symbol, interval, chart)
    }
}

fn chart_url(symbol: &Symbol, span: HistorySpan, interval: Interval) -> String {
    format!(
        "{CHART_ENDPOINT}/{}?range={}d&interval={}&includePrePost=false",
        urlencoding::encode(symbol.as_str()),
        span.as_days(),
        interval.as_str()
    )
}

fn parse_chart(
    symbol: &Symbol,
    interval: Interval,
    chart: YahooChartResponse,
) -> Result<PriceSeries, CoreError> {
    let Some(result) = chart.chart.result.and_then(|mut results| {
        if results.is_empty() {
            None
        } else {
            Some(results.swap_remove(0))
        }
    }) else {
        return Ok(PriceSeries::new(symbol.clone(), interval, Vec::new()));
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(PriceSeries::new(symbol.clone(), interval, Vec::new()));
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    let mut skipped = 0_usize;
    for (i, &ts_value) in timestamps.iter().enumerate() {
        let ts = UtcDateTime::from_unix_timestamp(ts_value).map_err(|e| {
            CoreError::data_unavailable(symbol, format!("invalid timestamp {ts_value}: {e}"))
        })?;

        // Only create a bar if all OHLC values are present
        if let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            quote.open.get(i),
            quote.high.get(i),
            quote.low.get(i),
            quote.close.get(i),
        ) {
            let volume = quote
                .volume
                .get(i)
                .copied()
                .flatten()
                .and_then(|v| u64::try_from(v).ok());

            match Bar::new(ts, *open, *high, *low, *close, volume) {
                Ok(bar) => bars.push(bar),
                Err(_) => skipped += 1,
            }
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        tracing::warn!(symbol = %symbol, skipped, "skipped incomplete yahoo rows");
    }

    Ok(PriceSeries::new(symbol.clone(), interval, bars))
}

// Fake data methods (mock mode)
fn fake_history(
    symbol: &Symbol,
    span: HistorySpan,
    interval: Interval,
) -> Result<PriceSeries, CoreError> {
    let timestamps = fake_timestamps(span, interval);
    let seed = symbol_seed(symbol);
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut previous = 40.0 + (seed % 260) as f64 + (seed % 100) as f64 / 100.0;

    let mut bars = Vec::with_capacity(timestamps.len());
    for ts in timestamps {
        let change = (rng.f64() - 0.48) * 0.03;
        let open = previous;
        let close = (open * (1.0 + change)).max(1.0);
        let high = open.max(close) * (1.0 + rng.f64() * 0.01);
        let low = open.min(close) * (1.0 - rng.f64() * 0.01);
        let volume = 500_000 + rng.u64(0..2_000_000);

        let bar = Bar::new(ts, open, high, low, close, Some(volume))
            .map_err(|e| CoreError::data_unavailable(symbol, e.to_string()))?;
        bars.push(bar);
        previous = close;
    }

    Ok(PriceSeries::new(symbol.clone(), interval, bars))
}

/// Session timestamps ending at the most recent weekday, oldest first.
fn fake_timestamps(span: HistorySpan, interval: Interval) -> Vec<UtcDateTime> {
    let mut session_day = UtcDateTime::now().into_inner().date();
    while is_weekend(session_day.weekday()) {
        match session_day.previous_day() {
            Some(previous) => session_day = previous,
            None => break,
        }
    }

    // 14:30 UTC is the regular US open
    let open_of = |day: time::Date| {
        day.with_hms(14, 30, 0)
            .map(|naive| naive.assume_utc())
            .ok()
            .and_then(|value| UtcDateTime::from_offset_datetime(value).ok())
    };

    let mut out = Vec::new();
    if interval.is_intraday() {
        let step = interval.step().whole_minutes().max(1);
        let Some(open) = open_of(session_day) else {
            return out;
        };
        let mut minute = 0;
        while minute < SESSION_MINUTES {
            if let Some(ts) = open.checked_add(Duration::minutes(minute)) {
                out.push(ts);
            }
            minute += step;
        }
        return out;
    }

    let mut day = session_day;
    let mut remaining = span.as_days();
    while remaining > 0 && out.len() < MAX_FAKE_BARS {
        if !is_weekend(day.weekday()) {
            if let Some(ts) = open_of(day) {
                out.push(ts);
            }
        }
        remaining -= 1;
        match day.previous_day() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    out.reverse();
    out
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Saturday | Weekday::Sunday)
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}

// Yahoo Finance chart API response structures
#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooChartError {
    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => format!("yahoo error {code}: {description}"),
            (None, Some(description)) => format!("yahoo error: {description}"),
            (Some(code), None) => format!("yahoo error {code}"),
            (None, None) => String::from("yahoo reported an unspecified error"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_url_encodes_symbol_and_window() {
        let symbol = Symbol::parse("^gspc").expect("valid");
        let url = chart_url(&symbol, HistorySpan::TEN_YEARS, Interval::OneDay);
        assert_eq!(
            url,
            "https://query1.finance.yahoo.com/v8/finance/chart/%5EGSPC?range=3650d&interval=1d&includePrePost=false"
        );
    }

    #[test]
    fn parse_chart_skips_rows_with_null_prices() {
        let body = r#"{"chart":{"result":[{"timestamp":[1704205800,1704292200,1704378600],
            "indicators":{"quote":[{"open":[185.0,null,182.0],"high":[186.0,null,183.5],
            "low":[183.0,null,181.0],"close":[185.6,null,181.9],"volume":[100,null,300]}]}}],
            "error":null}}"#;
        let chart: YahooChartResponse = serde_json::from_str(body).expect("valid json");
        let symbol = Symbol::parse("AAPL").expect("valid");

        let series = parse_chart(&symbol, Interval::OneDay, chart).expect("parses");
        assert_eq!(series.closes(), vec![185.6, 181.9]);
        assert_eq!(series.bars[1].volume, Some(300));
    }

    #[test]
    fn parse_chart_without_timestamps_is_empty() {
        let body = r#"{"chart":{"result":[{"meta":{"symbol":"X"},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let chart: YahooChartResponse = serde_json::from_str(body).expect("valid json");
        let symbol = Symbol::parse("X").expect("valid");

        let series = parse_chart(&symbol, Interval::OneDay, chart).expect("parses");
        assert!(series.is_empty());
    }

    #[test]
    fn fake_history_is_deterministic_per_symbol() {
        let symbol = Symbol::parse("MSFT").expect("valid");
        let span = HistorySpan::days(60).expect("valid");
        let first = fake_history(&symbol, span, Interval::OneDay).expect("fake");
        let second = fake_history(&symbol, span, Interval::OneDay).expect("fake");

        assert!(first.len() >= 40, "about five sessions per week");
        assert_eq!(first.closes(), second.closes());
    }

    #[test]
    fn fake_intraday_covers_one_session() {
        let symbol = Symbol::parse("AAPL").expect("valid");
        let series =
            fake_history(&symbol, HistorySpan::ONE_DAY, Interval::OneMinute).expect("fake");
        assert_eq!(series.len(), 390);
    }
}
