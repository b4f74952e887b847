//! Resolves TMDB movie and episode ids to playable HLS streams scraped from
//! the 8stream player site.
//!
//! ```no_run
//! use eightstream::{Config, EightStream, MediaType};
//!
//! # async fn run() -> eightstream::Result<()> {
//! let provider = EightStream::new(Config::from_env())?;
//! let streams = provider
//!     .get_streams("1399", MediaType::Tv, Some(1), Some(1), Some("tmdb-api-key"))
//!     .await;
//! for stream in streams {
//!     println!("{} {}", stream.quality, stream.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod eightstream;
pub mod error;
pub mod extractor;
pub mod http;
pub mod manifest;
pub mod playlist;
pub mod utils;

pub use api::{IdResolver, MediaType, TmdbResolver};
pub use config::Config;
pub use eightstream::{EightStream, PROVIDER, StreamResult};
pub use error::{Error, Result};
