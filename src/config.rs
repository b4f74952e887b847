use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://ftmoh345xme.com";
pub const DEFAULT_LOOKUP_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Environment variables checked, in order, for the forward proxy base URL.
pub const PROXY_ENV_VARS: [&str; 2] = ["EIGHTSTREAM_PROXY_URL", "PROXY_URL"];

/// Read-only configuration shared by every resolution call.
#[derive(Debug, Clone)]
pub struct Config {
    /// Provider site root, without trailing slash
    pub api_base: String,
    /// ID lookup API root, without trailing slash
    pub lookup_base: String,
    /// When set, every outbound URL is percent-encoded and appended to this
    pub proxy_url: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            lookup_base: DEFAULT_LOOKUP_BASE.to_string(),
            proxy_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Defaults plus the proxy URL from the environment, if any.
    pub fn from_env() -> Self {
        Self::default().with_proxy(proxy_from_env())
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_lookup_base(mut self, lookup_base: impl Into<String>) -> Self {
        self.lookup_base = lookup_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_proxy(mut self, proxy_url: Option<String>) -> Self {
        self.proxy_url = proxy_url.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// First non-empty proxy variable from [`PROXY_ENV_VARS`].
pub fn proxy_from_env() -> Option<String> {
    PROXY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_trims_trailing_slashes() {
        let config = Config::default()
            .with_api_base("http://localhost:1234/")
            .with_lookup_base("http://localhost:1234/3/");
        assert_eq!(config.api_base, "http://localhost:1234");
        assert_eq!(config.lookup_base, "http://localhost:1234/3");
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn blank_proxy_is_ignored() {
        let config = Config::default().with_proxy(Some("   ".into()));
        assert!(config.proxy_url.is_none());
    }
}
