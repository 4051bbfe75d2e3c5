use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::Result;

/// A subscription record as the remote side knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub url: String,
    pub title: String,
    pub icon_url: Option<String>,
}

impl Source {
    pub fn new(id: impl Into<String>, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            title: title.into(),
            icon_url: None,
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

/// Turn user input into a feed URL, assuming `https://` for bare hosts.
pub fn normalize_feed_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let candidate = if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate)?;
    Ok(url.to_string())
}
