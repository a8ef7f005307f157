//! Command-line interface definitions for the Rumble video updater.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every constant from the original one-shot script — target URL, store
//! path, attribution, timeouts — is a flag here with that value as its
//! default, and each can also be supplied via environment variable.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Rumble video updater.
///
/// The binary runs to completion with no required arguments: it scrapes the
/// configured channel listing once, merges any unseen videos into the store
/// file, and exits. Recurring execution is the job of an external invoker
/// (cron, CI schedule).
///
/// # Examples
///
/// ```sh
/// # Defaults: War Room channel into ./warroom_videos.json
/// rumble_video_updater
///
/// # A different channel and store
/// rumble_video_updater -c https://rumble.com/c/SomeChannel/videos -o videos.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Channel listing URL to scrape
    #[arg(
        short,
        long,
        env = "CHANNEL_URL",
        default_value = "https://rumble.com/c/BannonsWarRoom/videos"
    )]
    pub channel_url: String,

    /// Path of the persisted JSON video store
    #[arg(short, long, env = "OUTPUT_FILE", default_value = "warroom_videos.json")]
    pub output_file: PathBuf,

    /// Attribution recorded on every stored video
    #[arg(short, long, env = "UPLOADER", default_value = "https://warroom.org")]
    pub uploader: String,

    /// Navigation and selector-wait timeout, in seconds
    #[arg(long, env = "TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Vertical scroll offset in pixels, applied once the grid has rendered
    #[arg(long, env = "SCROLL_OFFSET", default_value_t = 500)]
    pub scroll_offset: u32,

    /// Settle delay after scrolling, in milliseconds
    #[arg(long, env = "SETTLE_MS", default_value_t = 2000)]
    pub settle_ms: u64,
}
