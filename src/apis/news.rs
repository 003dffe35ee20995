//! Latest headlines from NewsAPI `/everything`.

use serde::Deserialize;
use serde_json::Value;

use super::{ApiClients, ApiError};

pub const MAX_ARTICLES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: Option<String>,
    message: Option<String>,
    articles: Option<Vec<RawArticle>>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    title: Option<String>,
    url: Option<String>,
}

impl ApiClients {
    pub async fn search_news(&self, term: &str) -> Result<Vec<Article>, ApiError> {
        let key = Self::require_key(&self.keys.news_key, "news")?;
        let url = format!("{}/everything", self.endpoints.news);
        let page_size = MAX_ARTICLES.to_string();

        let body = self
            .get_json(
                &url,
                &[
                    ("q", term),
                    ("apiKey", key),
                    ("language", "pt"),
                    ("sortBy", "publishedAt"),
                    ("pageSize", page_size.as_str()),
                ],
            )
            .await?;
        parse_articles(body)
    }
}

/// Keep up to [`MAX_ARTICLES`] entries that carry both a title and a link.
pub fn parse_articles(body: Value) -> Result<Vec<Article>, ApiError> {
    let response: NewsResponse = serde_json::from_value(body)?;

    if response.status.as_deref() != Some("ok") {
        return Err(ApiError::NotFound(format!(
            "news status {}: {}",
            response.status.as_deref().unwrap_or("missing"),
            response.message.as_deref().unwrap_or("-")
        )));
    }

    let articles: Vec<Article> = response
        .articles
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| match (a.title, a.url) {
            (Some(title), Some(url)) if !title.trim().is_empty() && !url.trim().is_empty() => {
                Some(Article { title, url })
            }
            _ => None,
        })
        .take(MAX_ARTICLES)
        .collect();

    if articles.is_empty() {
        return Err(ApiError::NotFound("no articles".to_string()));
    }
    Ok(articles)
}
