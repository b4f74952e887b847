use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use eightstream::config::proxy_from_env;
use eightstream::{Config, EightStream, MediaType, StreamResult};

mod player;
mod settings;
mod ui;

use player::Player;
use settings::Settings;
use ui::{select_stream, spinner, stream_label};

#[derive(Parser, Debug)]
#[command(name = "eightstream", version, about = "Find playable streams for a TMDB movie or episode")]
struct Cli {
    /// TMDB id of the movie or show
    tmdb_id: String,

    /// Treat the id as a TV show
    #[arg(long, requires = "season", requires = "episode")]
    tv: bool,

    /// Season number (TV only)
    #[arg(short, long)]
    season: Option<u32>,

    /// Episode number (TV only)
    #[arg(short, long)]
    episode: Option<u32>,

    /// TMDB API key
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Forward proxy base URL; target URLs are appended percent-encoded
    #[arg(long)]
    proxy: Option<String>,

    /// Override the provider site root
    #[arg(long)]
    api_base: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Pick a stream and play it
    #[arg(short, long)]
    play: bool,

    /// Use VLC instead of mpv
    #[arg(long, requires = "play")]
    vlc: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn media_type(&self) -> MediaType {
        if self.tv { MediaType::Tv } else { MediaType::Movie }
    }

    fn title(&self) -> String {
        match (self.season, self.episode) {
            (Some(s), Some(e)) if self.tv => format!("TMDB {} S{:02}E{:02}", self.tmdb_id, s, e),
            _ => format!("TMDB {}", self.tmdb_id),
        }
    }

    // Flag, then environment, then settings file
    fn config(&self, settings: &Settings) -> Config {
        let mut config = Config::default().with_proxy(
            self.proxy
                .clone()
                .or_else(proxy_from_env)
                .or_else(|| settings.proxy_url.clone()),
        );
        if let Some(api_base) = self.api_base.clone().or_else(|| settings.api_base.clone()) {
            config = config.with_api_base(api_base);
        }
        config
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load()?;
    let api_key = cli.api_key.clone().or_else(|| settings.api_key.clone());
    let provider = EightStream::new(cli.config(&settings)).context("Failed to build HTTP client")?;

    let progress = spinner(&format!("Resolving streams for {}", cli.title()));
    let streams = provider
        .get_streams(
            &cli.tmdb_id,
            cli.media_type(),
            cli.season,
            cli.episode,
            api_key.as_deref(),
        )
        .await;
    progress.finish_and_clear();

    if streams.is_empty() {
        return Err(anyhow!("No streams found for {}", cli.title()));
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&streams)?);
    } else {
        for stream in &streams {
            println!("{}", stream_label(stream));
        }
    }

    if cli.play {
        let stream = choose_stream(&streams)?;
        let preferred = if cli.vlc { Player::Vlc } else { Player::Mpv };
        player::play(&stream.url, &cli.title(), preferred)?;
    }

    Ok(())
}

fn choose_stream(streams: &[StreamResult]) -> Result<&StreamResult> {
    if streams.len() == 1 {
        return Ok(&streams[0]);
    }
    let idx = select_stream(streams, "Select stream:")?;
    Ok(&streams[idx])
}
