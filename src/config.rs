use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub apis: ApiKeys,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub endpoints: Endpoints,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
}

/// Keys for the external data sources. Any of them may be missing; the
/// affected command then fails on its own without taking the bot down.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ApiKeys {
    pub currency_token: Option<String>,
    pub weather_key: Option<String>,
    pub gif_key: Option<String>,
    pub news_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    #[serde(default = "default_health_port")]
    pub port: u16,
}

/// Base URLs of the data APIs. Overridable so tests can point at a mock server.
#[derive(Debug, Deserialize, Clone)]
pub struct Endpoints {
    #[serde(default = "default_currency_url")]
    pub currency: String,
    #[serde(default = "default_weather_url")]
    pub weather: String,
    #[serde(default = "default_joke_url")]
    pub joke: String,
    #[serde(default = "default_gif_url")]
    pub gif: String,
    #[serde(default = "default_news_url")]
    pub news: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_health_enabled() -> bool {
    true
}

fn default_health_port() -> u16 {
    3000
}

fn default_currency_url() -> String {
    "https://economia.awesomeapi.com.br/json".to_string()
}

fn default_weather_url() -> String {
    "http://api.weatherapi.com/v1".to_string()
}

fn default_joke_url() -> String {
    "https://official-joke-api.appspot.com".to_string()
}

fn default_gif_url() -> String {
    "https://api.giphy.com/v1".to_string()
}

fn default_news_url() -> String {
    "https://newsapi.org/v2".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            port: default_health_port(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            currency: default_currency_url(),
            weather: default_weather_url(),
            joke: default_joke_url(),
            gif: default_gif_url(),
            news: default_news_url(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load the configuration file (if present) and apply environment overrides.
    ///
    /// The file is optional: a deployment that only sets environment variables
    /// (e.g. through `.env`) works without one. A bot token is required.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)?
        } else {
            Config::default()
        };

        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Override file values with the variables the bot has always been deployed with.
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(v) = get("DOLAR_API") {
            self.apis.currency_token = Some(v);
        }
        if let Some(v) = get("CLIMA_API_KEY") {
            self.apis.weather_key = Some(v);
        }
        if let Some(v) = get("GIF_API") {
            self.apis.gif_key = Some(v);
        }
        if let Some(v) = get("NEWS_API") {
            self.apis.news_key = Some(v);
        }
        if let Some(port) = get("PORT").and_then(|p| p.trim().parse().ok()) {
            self.health.port = port;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            anyhow::bail!("No bot token configured: set [telegram] bot_token or BOT_TOKEN");
        }
        if self.http.timeout_secs == 0 {
            anyhow::bail!("[http] timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Names of the data sources that have no key configured, for the startup log.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            ("weather", &self.apis.weather_key),
            ("gif", &self.apis.gif_key),
            ("news", &self.apis.news_key),
        ]
        .into_iter()
        .filter(|(_, key)| !ApiKeys::is_set(key))
        .map(|(name, _)| name)
        .collect()
    }
}

impl ApiKeys {
    /// A key counts as configured only when it holds something besides whitespace.
    pub fn is_set(key: &Option<String>) -> bool {
        key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}
