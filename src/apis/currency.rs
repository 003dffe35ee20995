//! Exchange rates from AwesomeAPI (`/last/{BASE}-{QUOTE}`).

use serde_json::Value;

use super::{ApiClients, ApiError};

impl ApiClients {
    pub async fn fetch_spot_rate(&self, base: &str, quote: &str) -> Result<f64, ApiError> {
        let url = format!("{}/last/{}-{}", self.endpoints.currency, base, quote);

        // The token only raises the rate limit; the API answers without one.
        let mut query = Vec::new();
        if let Some(token) = self.keys.currency_token.as_deref().filter(|t| !t.is_empty()) {
            query.push(("token", token));
        }

        let body = self.get_json(&url, &query).await?;
        parse_bid(&body, base, quote)
    }
}

/// Extract `"{BASE}{QUOTE}".bid`. The API sends the bid as a string.
pub fn parse_bid(body: &Value, base: &str, quote: &str) -> Result<f64, ApiError> {
    let key = format!("{}{}", base, quote);

    let entry = body
        .get(&key)
        .ok_or_else(|| ApiError::NotFound(format!("currency pair {}-{}", base, quote)))?;

    let bid = entry
        .get("bid")
        .ok_or_else(|| ApiError::Malformed(format!("{} has no bid", key)))?;

    let value = match bid {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };

    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| ApiError::Malformed(format!("{}.bid is not a number: {}", key, bid)))
}
