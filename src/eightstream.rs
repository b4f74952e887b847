use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::api::{IdResolver, MediaType, TmdbResolver};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::extractor::ConfigExtractor;
use crate::http::Fetcher;
use crate::manifest;
use crate::playlist::{Playlist, Target};

pub const PROVIDER: &str = "eightstream";

/// A playable stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamResult {
    pub url: String,
    /// "1080p", "Quality 2" or "Auto"
    pub quality: String,
    pub provider: String,
}

impl StreamResult {
    pub fn new(url: impl Into<String>, quality: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            quality: quality.into(),
            provider: PROVIDER.to_string(),
        }
    }
}

/// Stream resolver for the 8stream site.
///
/// Holds only read-only configuration, so one instance can serve any number
/// of concurrent [`get_streams`](Self::get_streams) calls.
#[derive(Debug, Clone)]
pub struct EightStream {
    fetcher: Fetcher,
    extractor: ConfigExtractor,
    resolver: Arc<dyn IdResolver>,
}

impl EightStream {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Fetcher::new(config)?;
        let resolver = Arc::new(TmdbResolver::new(fetcher.clone()));
        Ok(Self {
            fetcher,
            extractor: ConfigExtractor::new()?,
            resolver,
        })
    }

    /// Replaces the TMDB lookup.
    pub fn with_resolver(mut self, resolver: Arc<dyn IdResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replaces the markup patterns used to find the player config.
    pub fn with_extractor(mut self, extractor: ConfigExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &Config {
        self.fetcher.config()
    }

    /// Resolves `external_id` to its streams.
    ///
    /// Never fails: problems are logged and give an empty list. `season` and
    /// `episode` are only read for [`MediaType::Tv`].
    pub async fn get_streams(
        &self,
        external_id: &str,
        media_type: MediaType,
        season: Option<u32>,
        episode: Option<u32>,
        api_key: Option<&str>,
    ) -> Vec<StreamResult> {
        let Some(native_id) = self
            .resolver
            .native_id(external_id, media_type, api_key)
            .await
        else {
            return Vec::new();
        };

        match self.streams_for(&native_id, media_type, season, episode).await {
            Ok(streams) => {
                info!(external_id, native_id = %native_id, count = streams.len(), "streams found");
                streams
            }
            Err(e) => {
                error!(
                    external_id,
                    native_id = %native_id,
                    %media_type,
                    ?season,
                    ?episode,
                    error = %e,
                    "stream resolution failed"
                );
                Vec::new()
            }
        }
    }

    async fn streams_for(
        &self,
        native_id: &str,
        media_type: MediaType,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Result<Vec<StreamResult>> {
        let target = Target::new(media_type, season, episode)
            .ok_or_else(|| Error::not_found("series request without season and episode"))?;

        let page = self.extractor.fetch_page(&self.fetcher, native_id).await?;
        let playlist = Playlist::from_value(page.playlist, media_type)?;
        let entry = playlist.select(target)?;
        debug!(native_id, title = ?entry.title(), "selected file entry");

        let link = manifest::fetch_manifest_link(&self.fetcher, &entry.file, &page.key).await?;
        let manifest_url = link.trim();
        if !manifest_url.starts_with("http") {
            return Err(Error::validation(format!(
                "manifest link is not a URL: {}",
                crate::utils::preview(manifest_url, 80)
            )));
        }

        let content = self.fetcher.get_text(manifest_url, Default::default()).await?;
        if !manifest::is_hls(&content) {
            warn!(url = manifest_url, "not an HLS manifest, returning direct link");
            return Ok(vec![StreamResult::new(manifest_url, manifest::AUTO_QUALITY)]);
        }

        Ok(manifest::parse_manifest(&content, manifest_url))
    }
}
