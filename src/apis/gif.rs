//! GIF search through GIPHY.

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use super::{ApiClients, ApiError};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Option<Vec<GifObject>>,
}

#[derive(Debug, Deserialize)]
struct GifObject {
    images: Images,
}

#[derive(Debug, Deserialize)]
struct Images {
    original: Rendition,
}

#[derive(Debug, Deserialize)]
struct Rendition {
    url: String,
}

impl ApiClients {
    /// `term` is sent form-encoded, so its words reach GIPHY joined by `+`.
    pub async fn search_gif(&self, term: &str) -> Result<Url, ApiError> {
        let key = Self::require_key(&self.keys.gif_key, "gif")?;
        let url = format!("{}/gifs/search", self.endpoints.gif);

        let body = self
            .get_json(
                &url,
                &[("api_key", key), ("q", term), ("limit", "1"), ("rating", "g")],
            )
            .await?;
        parse_first_gif(body, term)
    }
}

pub fn parse_first_gif(body: Value, term: &str) -> Result<Url, ApiError> {
    let response: SearchResponse = serde_json::from_value(body)?;

    // GIPHY leaves `data` out entirely when the key is rejected.
    let data = response
        .data
        .ok_or_else(|| ApiError::Malformed("gif search response has no 'data'".to_string()))?;

    let first = data
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound(format!("no gif for '{}'", term)))?;

    Url::parse(&first.images.original.url)
        .map_err(|e| ApiError::Malformed(format!("bad gif url: {}", e)))
}
