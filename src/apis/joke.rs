use serde::Deserialize;
use serde_json::Value;

use super::{ApiClients, ApiError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Joke {
    pub setup: String,
    pub punchline: String,
}

impl ApiClients {
    pub async fn fetch_joke(&self) -> Result<Joke, ApiError> {
        let url = format!("{}/random_joke", self.endpoints.joke);
        let body = self.get_json(&url, &[]).await?;
        parse_joke(body)
    }
}

pub fn parse_joke(body: Value) -> Result<Joke, ApiError> {
    let joke: Joke = serde_json::from_value(body)?;
    if joke.setup.trim().is_empty() || joke.punchline.trim().is_empty() {
        return Err(ApiError::NotFound("empty joke".to_string()));
    }
    Ok(joke)
}
