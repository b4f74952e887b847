//! Page fetcher: pulls the player configuration out of the `/play/{id}`
//! page and downloads the playlist it points to.

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::http::{self, Fetcher};
use crate::utils::{preview, resolve_site_url};

/// Known markups for the inline player config, tried in order.
///
/// The first capture group must hold the JSON object literal.
pub const DEFAULT_PATTERNS: &[&str] = &[
    // let pc = {...};
    r"(\{[^;]+});",
    // new Playerjs({...})
    r"\((\{.*\})\)",
];

/// Player configuration embedded in the play page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    /// Playlist URL, absolute or site-root-relative
    pub file: String,
    /// Session token
    pub key: String,
}

/// Parsed playlist plus the token needed for follow-up requests.
#[derive(Debug, Clone)]
pub struct PageData {
    pub playlist: Value,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct ConfigExtractor {
    patterns: Vec<Regex>,
}

impl ConfigExtractor {
    pub fn new() -> Result<Self> {
        let patterns = DEFAULT_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::validation(format!("bad config pattern: {e}")))?;
        Ok(Self { patterns })
    }

    /// Adds a pattern, tried after the existing ones.
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Text of the last inline `<script>` of the page.
    pub fn last_script(html: &str) -> Result<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("script")
            .map_err(|e| Error::extraction(format!("invalid script selector: {e:?}")))?;

        document
            .select(&selector)
            .last()
            .map(|script| script.text().collect::<String>())
            .ok_or_else(|| Error::extraction("no script tag in play page"))
    }

    /// First JSON-object-shaped substring matched by one of the patterns.
    pub fn find_json<'s>(&self, script: &'s str) -> Option<&'s str> {
        self.patterns
            .iter()
            .find_map(|re| re.captures(script).and_then(|caps| caps.get(1)))
            .map(|m| m.as_str())
    }

    pub fn extract_config(&self, html: &str) -> Result<MediaConfig> {
        let script = Self::last_script(html)?;
        let literal = self
            .find_json(&script)
            .ok_or_else(|| Error::extraction("no player config in last script tag"))?;

        let data: Value = serde_json::from_str(literal)?;

        let file = data
            .get("file")
            .and_then(Value::as_str)
            .ok_or(Error::MissingField("file"))?;
        let key = data
            .get("key")
            .and_then(Value::as_str)
            .ok_or(Error::MissingField("key"))?;

        Ok(MediaConfig {
            file: file.to_string(),
            key: key.to_string(),
        })
    }

    /// Fetches the play page for `native_id`, then the playlist it names.
    pub async fn fetch_page(&self, fetcher: &Fetcher, native_id: &str) -> Result<PageData> {
        let api_base = &fetcher.config().api_base;
        let page_url = format!("{}/play/{}", api_base, native_id);

        let html = fetcher.get_text(&page_url, http::site_headers()).await?;
        let config = self.extract_config(&html)?;

        let playlist_url = resolve_site_url(api_base, &config.file);
        debug!(native_id, playlist_url = %playlist_url, "fetching playlist");

        let body = fetcher
            .get_text(&playlist_url, http::token_headers(&config.key)?)
            .await?;

        let playlist = serde_json::from_str(&body).map_err(|e| {
            error!(body = preview(&body, 200), "playlist response is not JSON");
            Error::parse(format!("playlist response: {e}"))
        })?;

        Ok(PageData {
            playlist,
            key: config.key,
        })
    }
}
