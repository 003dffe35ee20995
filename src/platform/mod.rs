pub mod telegram;

use reqwest::Url;

/// The single answer to one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Plain text, sent without a parse mode.
    Text(String),
    /// Text with Telegram HTML markup.
    Html(String),
    /// An externally hosted animation.
    Animation(Url),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }
}
