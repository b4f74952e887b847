//! Playlist shapes returned by the provider and the rules for picking a file.
//!
//! Movies get a flat list of file entries. Series get seasons, each holding
//! episodes, each holding per-language file variants. The shape is chosen by
//! media type before navigation, never guessed from the JSON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::api::MediaType;
use crate::error::{Error, Result};

const PREFERRED_TITLE: &str = "english";

/// A playable file variant.
///
/// Fields stay loosely typed: a non-string `file` is a validation failure
/// further down the pipeline, not a parse failure here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub file: Value,
}

impl FileEntry {
    pub fn title(&self) -> Option<&str> {
        self.title.as_str()
    }

    pub fn has_file(&self) -> bool {
        !self.file.is_null()
    }

    fn is_preferred(&self) -> bool {
        self.title()
            .is_some_and(|t| t.eq_ignore_ascii_case(PREFERRED_TITLE))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EpisodeEntry {
    #[serde(default)]
    pub episode: Value,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub folder: Vec<FileEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SeasonEntry {
    #[serde(default)]
    pub id: Value,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub folder: Vec<EpisodeEntry>,
}

/// Which file to pick out of a playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Movie,
    Episode { season: u32, episode: u32 },
}

impl Target {
    /// `None` for a series request missing its season or episode.
    pub fn new(media_type: MediaType, season: Option<u32>, episode: Option<u32>) -> Option<Self> {
        match media_type {
            MediaType::Movie => Some(Target::Movie),
            MediaType::Tv => Some(Target::Episode {
                season: season?,
                episode: episode?,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Playlist {
    Movie(Vec<FileEntry>),
    Series(Vec<SeasonEntry>),
}

impl Playlist {
    /// Interprets the raw playlist JSON according to `media_type`.
    pub fn from_value(value: Value, media_type: MediaType) -> Result<Self> {
        if !value.is_array() {
            return Err(Error::parse(format!("{media_type} playlist is not a list")));
        }
        let playlist = match media_type {
            MediaType::Movie => Playlist::Movie(decode_entries(value)),
            MediaType::Tv => Playlist::Series(decode_entries(value)),
        };
        Ok(playlist)
    }

    /// Locates the file entry for `target`.
    pub fn select(&self, target: Target) -> Result<&FileEntry> {
        match (self, target) {
            (Playlist::Movie(files), Target::Movie) => {
                pick_file(files).ok_or_else(|| Error::not_found("movie playlist is empty"))
            }
            (Playlist::Series(seasons), Target::Episode { season, episode }) => {
                select_episode_file(seasons, season, episode)
            }
            _ => Err(Error::validation("playlist shape does not match media type")),
        }
    }
}

// Malformed entries (null, strings, objects with a bad `folder`) are dropped
// so they cannot hide well-formed siblings. A non-list decodes as empty.
fn decode_entries<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

fn lenient_seq<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(decode_entries(Value::deserialize(deserializer)?))
}

/// The "english" entry if there is one, else the first.
fn pick_file(files: &[FileEntry]) -> Option<&FileEntry> {
    files.iter().find(|f| f.is_preferred()).or_else(|| files.first())
}

// Upstream ids must be strings equal to the decimal number; a numeric JSON
// id or a zero-padded "01" does not match.
fn string_equals(value: &Value, number: u32) -> bool {
    value.as_str() == Some(number.to_string().as_str())
}

fn select_episode_file(seasons: &[SeasonEntry], season: u32, episode: u32) -> Result<&FileEntry> {
    let season_entry = seasons
        .iter()
        .find(|s| string_equals(&s.id, season))
        .ok_or_else(|| Error::not_found(format!("season {season}")))?;

    let episode_entry = season_entry
        .folder
        .iter()
        .find(|e| string_equals(&e.episode, episode))
        .ok_or_else(|| Error::not_found(format!("season {season} episode {episode}")))?;

    let file = pick_file(&episode_entry.folder)
        .ok_or_else(|| Error::not_found(format!("no files for S{season}E{episode}")))?;

    if !file.has_file() {
        return Err(Error::MissingField("file"));
    }

    Ok(file)
}
