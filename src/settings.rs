use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Persistent CLI settings, stored next to the user's other config files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub proxy_url: Option<String>,
    pub api_base: Option<String>,
}

impl Settings {
    // Loads the settings file, or defaults if there is none
    pub fn load() -> Result<Self> {
        match settings_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Settings::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;

        if contents.trim().is_empty() {
            return Ok(Settings::default());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }
}

// <config_dir>/eightstream/config.json
fn settings_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("eightstream");
    path.push("config.json");
    Some(path)
}
