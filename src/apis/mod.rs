//! Clients for the third-party data APIs.
//!
//! Every call is a single GET bounded by the configured timeout. Response
//! bodies are untrusted: each client turns the JSON into a typed value at
//! this boundary, or into an [`ApiError`] the handlers can classify.

pub mod currency;
pub mod gif;
pub mod joke;
pub mod news;
pub mod weather;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::{ApiKeys, Config, Endpoints};

pub use joke::Joke;
pub use news::Article;
pub use weather::Weather;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection failure or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Body was not JSON, or a field had the wrong type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no API key configured for {0}")]
    MissingKey(&'static str),

    /// The API answered well-formed "no result".
    #[error("not found: {0}")]
    NotFound(String),

    /// Valid JSON without the fields we need.
    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

/// What the command handlers need from the outside world.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Bid price of one unit of `base` in `quote` (codes already upper-cased).
    async fn spot_rate(&self, base: &str, quote: &str) -> Result<f64, ApiError>;

    async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, ApiError> {
        Ok(amount * self.spot_rate(from, to).await?)
    }

    async fn weather(&self, city: &str) -> Result<Weather, ApiError>;

    async fn joke(&self) -> Result<Joke, ApiError>;

    /// Original-resolution URL of the first GIF matching `term`.
    async fn gif(&self, term: &str) -> Result<Url, ApiError>;

    async fn news(&self, term: &str) -> Result<Vec<Article>, ApiError>;
}

/// HTTP-backed [`DataSource`]. One shared connection pool for all APIs.
pub struct ApiClients {
    client: reqwest::Client,
    keys: ApiKeys,
    endpoints: Endpoints,
}

impl ApiClients {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http.timeout())
            .user_agent(concat!("ecobot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            keys: config.apis.clone(),
            endpoints: config.endpoints.clone(),
        })
    }

    /// GET `url` and parse the body as JSON whatever the status code: these
    /// APIs report "not found" inside a 4xx JSON body.
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        debug!("GET {}", url);

        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!("{} -> {} ({} bytes)", url, status, body.len());

        Ok(serde_json::from_slice(&body)?)
    }

    fn require_key<'a>(key: &'a Option<String>, source: &'static str) -> Result<&'a str, ApiError> {
        match key {
            Some(k) if ApiKeys::is_set(key) => Ok(k.as_str()),
            _ => Err(ApiError::MissingKey(source)),
        }
    }
}

#[async_trait]
impl DataSource for ApiClients {
    async fn spot_rate(&self, base: &str, quote: &str) -> Result<f64, ApiError> {
        self.fetch_spot_rate(base, quote).await
    }

    async fn weather(&self, city: &str) -> Result<Weather, ApiError> {
        self.fetch_weather(city).await
    }

    async fn joke(&self) -> Result<Joke, ApiError> {
        self.fetch_joke().await
    }

    async fn gif(&self, term: &str) -> Result<Url, ApiError> {
        self.search_gif(term).await
    }

    async fn news(&self, term: &str) -> Result<Vec<Article>, ApiError> {
        self.search_news(term).await
    }
}

/// Clients pointed at a mock server, with every key set.
#[cfg(test)]
pub(crate) fn test_clients(base_url: &str) -> ApiClients {
    test_clients_with_timeout(base_url, 10)
}

#[cfg(test)]
pub(crate) fn test_clients_with_timeout(base_url: &str, timeout_secs: u64) -> ApiClients {
    let mut config = Config::default();
    config.http.timeout_secs = timeout_secs;
    config.apis = ApiKeys {
        currency_token: Some("cur-token".to_string()),
        weather_key: Some("wx-key".to_string()),
        gif_key: Some("gif-key".to_string()),
        news_key: Some("news-key".to_string()),
    };
    config.endpoints = Endpoints {
        currency: base_url.to_string(),
        weather: base_url.to_string(),
        joke: base_url.to_string(),
        gif: base_url.to_string(),
        news: base_url.to_string(),
    };
    ApiClients::new(&config).unwrap()
}

/// Base URL of a local server that accepts connections and never answers.
#[cfg(test)]
pub(crate) async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });
    format!("http://{addr}")
}
