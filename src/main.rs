//! # Rumble Video Updater
//!
//! A one-shot watcher that checks a Rumble channel listing for newly
//! published videos and folds their metadata into a persisted JSON store,
//! avoiding duplicates and preserving chronological order.
//!
//! ## Usage
//!
//! ```sh
//! rumble_video_updater -c https://rumble.com/c/BannonsWarRoom/videos -o warroom_videos.json
//! ```
//!
//! ## Pipeline
//!
//! Each invocation runs the same fixed sequence and exits:
//! 1. **Watermark**: load the link of the newest stored video (creating the
//!    store file if absent, migrating the legacy shape if present)
//! 2. **Scrape**: drive a headless browser to the channel listing, wait for
//!    the video grid, extract records in newest-first DOM order, stopping
//!    early at the watermark
//! 3. **Merge**: prepend the unseen videos to the store and rewrite it
//!
//! Scrape failures are logged and abort the run without touching the store;
//! the process still exits zero, so the only failure signal is the log text.
//! Recurring execution is delegated to an external invoker such as a cron
//! job or CI schedule.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

mod browser;
mod cli;
mod dates;
mod models;
mod scrapers;
mod store;

use browser::ChromeTab;
use cli::Cli;
use scrapers::rumble::{self, ChannelConfig};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("video_update starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.channel_url, ?args.output_file, "Parsed CLI arguments");

    let config = ChannelConfig {
        channel_url: Url::parse(&args.channel_url)?,
        uploader: args.uploader.clone(),
        scroll_offset: args.scroll_offset,
        settle_delay: Duration::from_millis(args.settle_ms),
    };

    // ---- Watermark ----
    let watermark = store::load_most_recent_link(&args.output_file).await?;
    match &watermark {
        Some(link) => info!(%link, "Last known video"),
        None => info!("No prior video history"),
    }

    // ---- Scrape ----
    let page = match ChromeTab::launch(Duration::from_secs(args.timeout_secs)) {
        Ok(page) => page,
        Err(e) => {
            error!(error = %e, "Failed to launch browser; store left untouched");
            return Ok(());
        }
    };

    let outcome = match rumble::scrape(&page, &config, watermark.as_deref()) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Error during scraping; store left untouched");
            return Ok(());
        }
    };

    // ---- Merge ----
    let total_processed = outcome.thumbnail_count;
    match store::apply_scrape_outcome(&args.output_file, outcome).await {
        Ok(added) => info!(added, total_processed, "Scraping completed"),
        Err(e) => error!(error = %e, "Merge failed; store left untouched"),
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
