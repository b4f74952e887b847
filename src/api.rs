//! Catalog ID lookup: TMDB id -> provider-native (IMDb) id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::http::Fetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" => Ok(MediaType::Movie),
            "tv" | "series" | "show" => Ok(MediaType::Tv),
            other => Err(format!("unknown media type: {other}")),
        }
    }
}

/// Maps an external catalog id to the id the provider site understands.
///
/// Implementations fail soft: any problem is logged and reported as `None`.
#[async_trait]
pub trait IdResolver: Send + Sync + fmt::Debug {
    async fn native_id(
        &self,
        external_id: &str,
        media_type: MediaType,
        api_key: Option<&str>,
    ) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    imdb_id: Option<String>,
}

/// TMDB `external_ids` lookup.
#[derive(Debug, Clone)]
pub struct TmdbResolver {
    fetcher: Fetcher,
}

impl TmdbResolver {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    fn lookup_url(&self, external_id: &str, media_type: MediaType, api_key: &str) -> String {
        format!(
            "{}/{}/{}/external_ids?api_key={}",
            self.fetcher.config().lookup_base,
            media_type,
            urlencoding::encode(external_id),
            urlencoding::encode(api_key)
        )
    }
}

#[async_trait]
impl IdResolver for TmdbResolver {
    async fn native_id(
        &self,
        external_id: &str,
        media_type: MediaType,
        api_key: Option<&str>,
    ) -> Option<String> {
        let Some(api_key) = api_key.filter(|k| !k.trim().is_empty()) else {
            warn!(external_id, "no TMDB API key configured, skipping lookup");
            return None;
        };

        let url = self.lookup_url(external_id, media_type, api_key);
        let resp = match self.fetcher.get(&url, Default::default()).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(external_id, %media_type, error = %e, "external id lookup failed");
                return None;
            }
        };

        let ids: ExternalIds = match resp.json().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(external_id, error = %e, "malformed external id response");
                return None;
            }
        };

        match ids.imdb_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                debug!(external_id, native_id = %id, "resolved native id");
                Some(id)
            }
            None => {
                warn!(external_id, %media_type, "no IMDb id for this title");
                None
            }
        }
    }
}
