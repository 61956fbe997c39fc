use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::{HttpAuth, HttpClient, HttpRequest, NoopHttpClient, DEFAULT_TIMEOUT_MS};
use crate::market_data::GatewayFuture;
use crate::news::{news_window, NewsGateway};
use crate::{AppConfig, Article, CoreError, ProviderId, Symbol, UtcDateTime};

const EVERYTHING_ENDPOINT: &str = "https://newsapi.org/v2/everything";
const API_KEY_HEADER: &str = "X-Api-Key";

/// NewsAPI `everything` search, or canned articles in mock mode.
#[derive(Clone)]
pub struct NewsApiClient {
    http_client: Arc<dyn HttpClient>,
    api_key: Option<String>,
    timeout_ms: u64,
    use_real_api: bool,
}

impl Default for NewsApiClient {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            use_real_api: false,
        }
    }
}

impl NewsApiClient {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        let is_real = !http_client.is_mock();
        Self {
            http_client,
            api_key,
            use_real_api: is_real,
            ..Self::default()
        }
    }

    /// The key is optional here; a missing key fails at fetch time.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_http_client(
            config.http_client(),
            config.news_api_key().ok().map(str::to_owned),
        )
        .with_timeout_ms(config.timeout_ms())
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn is_real_client(&self) -> bool {
        self.use_real_api
    }
}

impl NewsGateway for NewsApiClient {
    fn id(&self) -> ProviderId {
        if self.is_real_client() {
            ProviderId::Newsapi
        } else {
            ProviderId::Mock
        }
    }

    fn fetch<'a>(&'a self, symbol: &'a Symbol) -> GatewayFuture<'a, Vec<Article>> {
        Box::pin(async move {
            if !self.is_real_client() {
                return Ok(fake_articles(symbol));
            }
            self.fetch_real(symbol).await
        })
    }
}

impl NewsApiClient {
    async fn fetch_real(&self, symbol: &Symbol) -> Result<Vec<Article>, CoreError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            CoreError::configuration(
                "news API key is not set; export TRADETALK_NEWS_API_KEY (or NEWSAPI_KEY)",
            )
        })?;

        let (from, to) = news_window(UtcDateTime::now().date());
        let endpoint = format!(
            "{EVERYTHING_ENDPOINT}?q={}&from={from}&to={to}&language=en",
            urlencoding::encode(symbol.as_str())
        );
        tracing::debug!(url = %endpoint, "requesting news");

        let request = HttpRequest::get(&endpoint)
            .with_auth(&HttpAuth::Header {
                name: String::from(API_KEY_HEADER),
                value: api_key.to_owned(),
            })
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|e| {
            if e.timed_out() {
                CoreError::news_unavailable(format!(
                    "newsapi request timed out after {} ms",
                    self.timeout_ms
                ))
            } else {
                CoreError::news_unavailable(format!("newsapi transport error: {}", e.message()))
            }
        })?;

        parse_everything(response.status, &response.body)
    }
}

fn parse_everything(status: u16, body: &str) -> Result<Vec<Article>, CoreError> {
    let parsed = serde_json::from_str::<EverythingResponse>(body);

    if !(200..300).contains(&status) {
        let detail = parsed
            .ok()
            .and_then(|payload| payload.message)
            .unwrap_or_else(|| String::from("no detail"));
        return Err(CoreError::news_unavailable(match status {
            401 => format!("newsapi rejected the API key: {detail}"),
            _ => format!("newsapi returned status {status}: {detail}"),
        }));
    }

    let payload = parsed
        .map_err(|e| CoreError::news_unavailable(format!("failed to parse newsapi response: {e}")))?;

    if payload.status.as_deref() == Some("error") {
        return Err(CoreError::news_unavailable(format!(
            "newsapi error {}: {}",
            payload.code.as_deref().unwrap_or("unknown"),
            payload.message.as_deref().unwrap_or("no detail")
        )));
    }

    let articles = payload
        .articles
        .into_iter()
        .filter_map(NewsApiArticle::into_article)
        .collect::<Vec<_>>();

    tracing::debug!(articles = articles.len(), "news fetched");
    Ok(articles)
}

fn fake_articles(symbol: &Symbol) -> Vec<Article> {
    let published_at = Some(UtcDateTime::now());
    let ticker = symbol.as_str();
    vec![
        Article {
            title: format!("{ticker} shares steady as traders weigh guidance"),
            description: Some(format!(
                "Analysts kept their outlook on {ticker} unchanged ahead of the next earnings call."
            )),
            url: format!("https://news.example.com/{}/guidance", ticker.to_ascii_lowercase()),
            image_url: None,
            source: Some(String::from("Mock Wire")),
            published_at,
        },
        Article {
            title: format!("What options activity says about {ticker}"),
            description: None,
            url: format!("https://news.example.com/{}/options", ticker.to_ascii_lowercase()),
            image_url: Some(String::from("https://news.example.com/static/options.png")),
            source: Some(String::from("Mock Markets")),
            published_at,
        },
    ]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    source: Option<NewsApiSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    url_to_image: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    #[serde(default)]
    name: Option<String>,
}

impl NewsApiArticle {
    fn into_article(self) -> Option<Article> {
        let (Some(title), Some(url)) = (self.title, self.url) else {
            tracing::debug!("skipping article without title or url");
            return None;
        };

        Some(Article {
            title,
            description: self.description,
            url,
            image_url: self.url_to_image,
            source: self.source.and_then(|source| source.name),
            published_at: self
                .published_at
                .as_deref()
                .and_then(|raw| UtcDateTime::parse(raw).ok()),
        })
    }
}
