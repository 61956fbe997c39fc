//! Runtime configuration, built once at startup and passed by reference.
//!
//! # Environment Variables
//!
//! | Setting | Primary Env Var | Fallback Env Var | Default |
//! |---------|-----------------|------------------|---------|
//! | Directory file | `TRADETALK_DIRECTORY` | - | `cname.xls` |
//! | Directory rows | `TRADETALK_DIRECTORY_ROWS` | - | `505` (`all` reads every row) |
//! | News API key | `TRADETALK_NEWS_API_KEY` | `NEWSAPI_KEY` | none |
//! | HTTP timeout | `TRADETALK_TIMEOUT_MS` | - | `10000` |
//! | Mock mode | `TRADETALK_MOCK` | - | off |
//! | Prediction history | `TRADETALK_PREDICTION_SPAN_DAYS` | - | `365` |

use std::env;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::http_client::{HttpClient, NoopHttpClient, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::{CoreError, HistorySpan};

pub const DEFAULT_DIRECTORY_PATH: &str = "cname.xls";
pub const DEFAULT_DIRECTORY_ROWS: usize = 505;

/// Where the ticker directory lives and how many rows it must provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub path: PathBuf,
    /// `None` reads every row in the sheet.
    pub expected_rows: Option<usize>,
}

impl DirectoryConfig {
    pub fn new(path: impl Into<PathBuf>, expected_rows: Option<usize>) -> Self {
        Self {
            path: path.into(),
            expected_rows,
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTORY_PATH, Some(DEFAULT_DIRECTORY_ROWS))
    }
}

/// Application configuration shared by every component.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    directory: DirectoryConfig,
    news_api_key: Option<String>,
    timeout_ms: u64,
    mock: bool,
    prediction_span: HistorySpan,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            directory: DirectoryConfig::default(),
            news_api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            mock: false,
            prediction_span: HistorySpan::ONE_YEAR,
        }
    }
}

impl AppConfig {
    /// Reads settings from the environment. Malformed values are configuration errors.
    pub fn from_env() -> Result<Self, CoreError> {
        let mut config = Self::default();

        if let Some(path) = non_empty_var("TRADETALK_DIRECTORY") {
            config.directory.path = PathBuf::from(path);
        }

        if let Some(rows) = non_empty_var("TRADETALK_DIRECTORY_ROWS") {
            config.directory.expected_rows = parse_rows(&rows)?;
        }

        config.news_api_key =
            non_empty_var("TRADETALK_NEWS_API_KEY").or_else(|| non_empty_var("NEWSAPI_KEY"));

        if let Some(timeout) = non_empty_var("TRADETALK_TIMEOUT_MS") {
            config.timeout_ms = parse_timeout_ms(&timeout)?;
        }

        if let Some(mock) = non_empty_var("TRADETALK_MOCK") {
            config.mock = matches!(mock.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Some(days) = non_empty_var("TRADETALK_PREDICTION_SPAN_DAYS") {
            let span = days
                .parse::<u32>()
                .ok()
                .and_then(|days| HistorySpan::days(days).ok())
                .ok_or_else(|| {
                    CoreError::configuration(format!(
                        "TRADETALK_PREDICTION_SPAN_DAYS must be a positive integer, got '{days}'"
                    ))
                })?;
            config.prediction_span = span;
        }

        Ok(config)
    }

    pub fn with_directory(mut self, directory: DirectoryConfig) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_directory_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.directory.path = path.into();
        self
    }

    pub fn with_news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    pub fn directory(&self) -> &DirectoryConfig {
        &self.directory
    }

    pub fn directory_path(&self) -> &Path {
        &self.directory.path
    }

    /// The news key has no default; callers fail fast before any request.
    pub fn news_api_key(&self) -> Result<&str, CoreError> {
        self.news_api_key.as_deref().ok_or_else(|| {
            CoreError::configuration(
                "news API key is not set; export TRADETALK_NEWS_API_KEY (or NEWSAPI_KEY)",
            )
        })
    }

    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub const fn is_mock(&self) -> bool {
        self.mock
    }

    pub const fn prediction_span(&self) -> HistorySpan {
        self.prediction_span
    }

    /// Transport matching the configured mode.
    pub fn http_client(&self) -> Arc<dyn HttpClient> {
        if self.mock {
            Arc::new(NoopHttpClient)
        } else {
            Arc::new(ReqwestHttpClient::new())
        }
    }
}

impl Debug for AppConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("directory", &self.directory)
            .field(
                "news_api_key",
                &self.news_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout_ms", &self.timeout_ms)
            .field("mock", &self.mock)
            .field("prediction_span", &self.prediction_span)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_rows(raw: &str) -> Result<Option<usize>, CoreError> {
    if raw.eq_ignore_ascii_case("all") {
        return Ok(None);
    }

    match raw.parse::<usize>() {
        Ok(rows) if rows > 0 => Ok(Some(rows)),
        _ => Err(CoreError::configuration(format!(
            "TRADETALK_DIRECTORY_ROWS must be a positive integer or 'all', got '{raw}'"
        ))),
    }
}

fn parse_timeout_ms(raw: &str) -> Result<u64, CoreError> {
    match raw.parse::<u64>() {
        Ok(timeout_ms) if timeout_ms > 0 => Ok(timeout_ms),
        _ => Err(CoreError::configuration(format!(
            "TRADETALK_TIMEOUT_MS must be a positive integer, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn defaults_match_bundled_directory() {
        let config = AppConfig::default();
        assert_eq!(config.directory_path(), Path::new("cname.xls"));
        assert_eq!(config.directory().expected_rows, Some(505));
        assert_eq!(config.timeout_ms(), 10_000);
        assert_eq!(config.prediction_span().as_days(), 365);
        assert!(!config.is_mock());
    }

    #[test]
    fn missing_news_key_is_configuration_error() {
        let error = AppConfig::default()
            .news_api_key()
            .expect_err("no key configured");
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn debug_redacts_news_key() {
        let config = AppConfig::default().with_news_api_key("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert_eq!(config.news_api_key().expect("configured"), "super-secret");
    }

    #[test]
    fn parses_row_limits() {
        assert_eq!(parse_rows("all").expect("all"), None);
        assert_eq!(parse_rows("20").expect("number"), Some(20));
        assert!(parse_rows("0").is_err());
        assert!(parse_rows("many").is_err());
    }

    #[test]
    fn parses_timeouts() {
        assert_eq!(parse_timeout_ms("2500").expect("number"), 2_500);
        assert_eq!(parse_timeout_ms("1").expect("smallest"), 1);
        for raw in ["0", "-5", "soon"] {
            let error = parse_timeout_ms(raw).expect_err("rejected");
            assert_eq!(error.kind(), ErrorKind::Configuration);
            assert!(error.to_string().contains(raw), "{error}");
        }
    }

    #[test]
    fn mock_mode_selects_noop_transport() {
        assert!(AppConfig::default().with_mock(true).http_client().is_mock());
    }
}
