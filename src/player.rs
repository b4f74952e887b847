use anyhow::{Context, Result, anyhow};
use std::process::{Command, Stdio};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    Mpv,
    Vlc,
}

impl Player {
    pub fn program(&self) -> &'static str {
        match self {
            Player::Mpv => "mpv",
            Player::Vlc => "vlc",
        }
    }

    fn other(&self) -> Player {
        match self {
            Player::Mpv => Player::Vlc,
            Player::Vlc => Player::Mpv,
        }
    }

    // Looks the player up on PATH without launching it
    pub fn is_installed(&self) -> bool {
        Command::new("which")
            .arg(self.program())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    pub fn args(&self, stream_url: &str, title: &str) -> Vec<String> {
        match self {
            Player::Mpv => vec![
                "--force-window=yes".to_string(),
                format!("--force-media-title={title}"),
                stream_url.to_string(),
            ],
            Player::Vlc => vec![
                "--play-and-exit".to_string(),
                format!("--meta-title={title}"),
                stream_url.to_string(),
            ],
        }
    }
}

/// Plays `stream_url` with `preferred`, or the other player if it is missing.
pub fn play(stream_url: &str, title: &str, preferred: Player) -> Result<()> {
    let player = if preferred.is_installed() {
        preferred
    } else if preferred.other().is_installed() {
        warn!("{} not found, using {}", preferred.program(), preferred.other().program());
        preferred.other()
    } else {
        return Err(anyhow!("neither mpv nor vlc is installed"));
    };

    info!(player = player.program(), url = stream_url, "starting playback");
    let status = Command::new(player.program())
        .args(player.args(stream_url, title))
        .status()
        .with_context(|| format!("Failed to launch {}", player.program()))?;

    if !status.success() {
        return Err(anyhow!("{} exited with {}", player.program(), status));
    }
    Ok(())
}
