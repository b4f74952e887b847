//! Shared fetch helper.
//!
//! Every outbound request of the pipeline goes through [`Fetcher`], which
//! applies the optional forward proxy and the per-request timeout.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};

/// Header carrying the session token on playlist and manifest requests.
pub const TOKEN_HEADER: &str = "x-csrf-token";

const SPOOFED_ORIGIN: &str = "https://www.google.com";
const SPOOFED_REFERER: &str = "https://www.google.com/";

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: Config,
}

impl Fetcher {
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self::with_client(client, config))
    }

    /// Use an existing client, e.g. to share its connection pool.
    pub fn with_client(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The URL actually requested for `url`, after proxy rewriting.
    pub fn request_url(&self, url: &str) -> String {
        match &self.config.proxy_url {
            Some(proxy) => format!("{}{}", proxy, urlencoding::encode(url)),
            None => url.to_string(),
        }
    }

    /// GET `url` with `headers`; non-success statuses are errors.
    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<Response> {
        let target = self.request_url(url);
        debug!(url, proxied = target != url, "GET");

        let resp = self
            .client
            .get(&target)
            .headers(headers)
            .timeout(self.config.timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Status {
                status: resp.status(),
                url: url.to_string(),
            });
        }

        Ok(resp)
    }

    pub async fn get_text(&self, url: &str, headers: HeaderMap) -> Result<String> {
        Ok(self.get(url, headers).await?.text().await?)
    }
}

/// Origin/Referer/DNT set sent to the provider site.
pub fn site_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(reqwest::header::ORIGIN, HeaderValue::from_static(SPOOFED_ORIGIN));
    headers.insert(reqwest::header::REFERER, HeaderValue::from_static(SPOOFED_REFERER));
    headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    headers
}

/// [`site_headers`] plus the session token.
pub fn token_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = site_headers();
    let value = HeaderValue::from_str(token)
        .map_err(|_| Error::validation("token contains characters not allowed in a header"))?;
    headers.insert(HeaderName::from_static(TOKEN_HEADER), value);
    Ok(headers)
}
