//! Page title fetching
//!
//! Fetches a URL and pulls the text of its `<title>` element. Every failure
//! (transport error, non-200 status, missing title) yields `None`; callers
//! fall back to storing the page without a title.

use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{bail, Result};
use regex::Regex;
use tracing::debug;

use crate::config::Config;

/// Only the start of the document is searched for a title
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; bookmarks/0.3)";

/// Source of page titles for URL intake
pub trait TitleFetcher {
    /// Best-effort title of the page at `url`
    fn fetch_title(&self, url: &str) -> Option<String>;
}

/// Fetches titles over HTTP
pub struct HttpTitleFetcher {
    timeout: Duration,
}

impl HttpTitleFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.fetch_timeout())
    }

    fn fetch_inner(&self, url: &str) -> Result<Option<String>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let response = client.get(url).send()?;
        if response.status() != reqwest::StatusCode::OK {
            bail!("unexpected status {}", response.status());
        }

        let mut body = Vec::new();
        response.take(MAX_BODY_BYTES).read_to_end(&mut body)?;
        Ok(extract_title(&String::from_utf8_lossy(&body)))
    }
}

impl Default for HttpTitleFetcher {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl TitleFetcher for HttpTitleFetcher {
    fn fetch_title(&self, url: &str) -> Option<String> {
        match self.fetch_inner(url) {
            Ok(title) => title,
            Err(e) => {
                debug!("Title fetch failed for {}: {}", url, e);
                None
            }
        }
    }
}

/// Text of the first `<title>` element, trimmed and entity-decoded
pub fn extract_title(html: &str) -> Option<String> {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    let re = TITLE.get_or_init(|| {
        Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").expect("title pattern is valid")
    });

    let raw = re.captures(html)?.get(1)?.as_str();
    let title = unescape_entities(raw.trim());
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Decode the handful of entities common in titles
///
/// `&amp;` is decoded first, so a double-escaped `&amp;lt;` ends up as `<`.
pub fn unescape_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
}
