//! Reply text for the API results. Everything here is pure.

use crate::apis::{Article, Joke, Weather};

/// Keyword groups checked in order against the lower-cased description.
const WEATHER_SYMBOLS: &[(&[&str], &str)] = &[
    (&["nublado", "nuvens"], "☁️"),
    (&["chuva"], "🌧️"),
    (&["limpo", "sol"], "☀️"),
    (&["neve"], "❄️"),
    (&["tempest"], "⛈️"),
];

const DEFAULT_WEATHER_SYMBOL: &str = "🌡️";

pub fn weather_symbol(description: &str) -> &'static str {
    let description = description.to_lowercase();
    WEATHER_SYMBOLS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| description.contains(k)))
        .map(|(_, symbol)| *symbol)
        .unwrap_or(DEFAULT_WEATHER_SYMBOL)
}

pub fn money(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn dollar_quote(bid: f64) -> String {
    format!("Cotação do dólar: R$ {}", money(bid))
}

pub fn conversion(amount: f64, from: &str, total: f64, to: &str) -> String {
    format!("{} {} = {} {}", money(amount), from, money(total), to)
}

pub fn weather_report(city: &str, weather: &Weather) -> String {
    format!(
        "{} Clima em {}: {}, {:.1}°C",
        weather_symbol(&weather.condition),
        title_case(city),
        weather.condition,
        weather.temp_c
    )
}

pub fn joke(joke: &Joke) -> String {
    format!("{}\n\n{}", joke.setup, joke.punchline)
}

pub fn news_digest(articles: &[Article]) -> String {
    articles
        .iter()
        .take(crate::apis::news::MAX_ARTICLES)
        .map(|a| format!("• {}\n{}", a.title, a.url))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Upper-case the first letter of every word, lower-case the rest.
/// A word starts after any non-alphabetic character ("são-paulo" → "São-Paulo").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
