//! Manifest resolution and HLS master playlist parsing.

use m3u8_rs::{MasterPlaylist, Playlist};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::eightstream::StreamResult;
use crate::error::{Error, Result};
use crate::http::{self, Fetcher};
use crate::utils::strip_first_char;

/// Marker every HLS playlist starts with.
pub const HLS_SIGNATURE: &str = "#EXTM3U";

pub const AUTO_QUALITY: &str = "Auto";

/// `{api_base}/playlist/{file without its leading character}.txt`
pub fn manifest_link_url(api_base: &str, file_path: &str) -> String {
    format!("{}/playlist/{}.txt", api_base, strip_first_char(file_path))
}

/// Asks the provider which URL serves `file`; returns the raw response text.
pub async fn fetch_manifest_link(fetcher: &Fetcher, file: &Value, token: &str) -> Result<String> {
    let file_path = match file {
        Value::String(path) if !path.is_empty() => path,
        Value::Null => return Err(Error::validation("file entry has no file path")),
        other => return Err(Error::validation(format!("file path is not a string: {other}"))),
    };

    let url = manifest_link_url(&fetcher.config().api_base, file_path);
    debug!(url = %url, "resolving manifest link");
    fetcher.get_text(&url, http::token_headers(token)?).await
}

pub fn is_hls(content: &str) -> bool {
    content.contains(HLS_SIGNATURE)
}

/// Lists the quality variants of the manifest fetched from `base_url`.
///
/// Never fails: a media playlist, a master playlist without variants, or
/// anything unparsable yields a single `Auto` entry pointing at `base_url`.
pub fn parse_manifest(text: &str, base_url: &str) -> Vec<StreamResult> {
    let fallback = || vec![StreamResult::new(base_url, AUTO_QUALITY)];

    let Ok(base) = Url::parse(base_url) else {
        warn!(base_url, "manifest base is not a valid URL");
        return fallback();
    };

    match m3u8_rs::parse_playlist_res(text.as_bytes()) {
        Ok(Playlist::MasterPlaylist(master)) => {
            let streams = variant_streams(&master, &base);
            if streams.is_empty() {
                fallback()
            } else {
                streams
            }
        }
        Ok(Playlist::MediaPlaylist(_)) => fallback(),
        Err(e) => {
            debug!(error = ?e, "manifest did not parse as HLS");
            fallback()
        }
    }
}

fn variant_streams(master: &MasterPlaylist, base: &Url) -> Vec<StreamResult> {
    master
        .variants
        .iter()
        .filter(|v| !v.is_i_frame)
        .enumerate()
        .map(|(idx, variant)| {
            let quality = match &variant.resolution {
                Some(res) if res.height > 0 => format!("{}p", res.height),
                _ => format!("Quality {}", idx + 1),
            };
            let url = base
                .join(&variant.uri)
                .map(String::from)
                .unwrap_or_else(|_| variant.uri.clone());
            StreamResult::new(url, quality)
        })
        .collect()
}
