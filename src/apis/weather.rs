//! Current conditions from WeatherAPI.com.

use serde::Deserialize;
use serde_json::Value;

use super::{ApiClients, ApiError};

#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    pub temp_c: f64,
    pub condition: String,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp_c: f64,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

impl ApiClients {
    pub async fn fetch_weather(&self, city: &str) -> Result<Weather, ApiError> {
        let key = Self::require_key(&self.keys.weather_key, "weather")?;
        let url = format!("{}/current.json", self.endpoints.weather);

        let body = self
            .get_json(&url, &[("key", key), ("q", city), ("lang", "pt")])
            .await?;
        parse_weather(body)
    }
}

/// Any top-level `error` object means the location was not resolved.
pub fn parse_weather(mut body: Value) -> Result<Weather, ApiError> {
    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("location not found");
        return Err(ApiError::NotFound(message.to_string()));
    }

    let current = body
        .get_mut("current")
        .map(Value::take)
        .ok_or_else(|| ApiError::Malformed("weather response has no 'current'".to_string()))?;
    let current: Current = serde_json::from_value(current)?;

    Ok(Weather {
        temp_c: current.temp_c,
        condition: current.condition.text,
    })
}
