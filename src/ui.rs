use anyhow::{Context, Result};
use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use eightstream::StreamResult;

// "1080p      https://..." menu line
pub fn stream_label(stream: &StreamResult) -> String {
    format!("{:<10} {}", stream.quality, stream.url)
}

// Lets the user pick one of several streams; returns its index
pub fn select_stream(streams: &[StreamResult], prompt: &str) -> Result<usize> {
    let labels: Vec<String> = streams.iter().map(stream_label).collect();
    let selection = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()
        .context("Failed to read stream selection")?;

    Ok(selection)
}

// Spinner shown on stderr while a request is in flight
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
