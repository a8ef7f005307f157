//! Persisted store access: watermark lookup and merge-with-existing-file.
//!
//! The store is a single pretty-printed JSON file owning the full video
//! history. Two on-disk shapes are tolerated on every read — the current
//! `{last_updated, videos}` object and the legacy bare array — and the
//! legacy shape is migrated in place the first time it is seen.
//!
//! # Failure policy
//!
//! - A missing file is "no prior history": it is created empty on first load
//!   and treated as empty during merge.
//! - A corrupt file during [`load_most_recent_link`] downgrades to "no
//!   watermark" (logged). The scrape then re-extracts everything, and the
//!   merge dedupe drops what is already stored.
//! - A corrupt file during [`merge_and_persist`] is an error and the merge
//!   aborts without writing. Treating it as empty history would rewrite the
//!   file and destroy everything previously stored.

use crate::models::{StoreFile, VideoRecord, VideoStore};
use crate::scrapers::rumble::ScrapeOutcome;
use chrono::Utc;
use itertools::Itertools;
use std::collections::HashSet;
use std::error::Error;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument, warn};

/// Load the watermark: the link of the newest stored video.
///
/// If the store file is absent it is created with an empty video list and
/// the current timestamp. A file in the legacy bare-array shape is rewritten
/// in the current shape before the watermark is returned.
///
/// # Returns
///
/// The `link` of the first (newest) stored record, or `None` when there is
/// no prior history — the file was just created, the list is empty, or the
/// file could not be read or parsed (logged).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_most_recent_link(path: &Path) -> Result<Option<String>, Box<dyn Error>> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("Store file not found; creating an empty one");
            write_store(path, &VideoStore::empty(Utc::now())).await?;
            return Ok(None);
        }
        Err(e) => {
            warn!(error = %e, "Failed to read store file; treating as no history");
            return Ok(None);
        }
    };

    let file: StoreFile = match serde_json::from_str(&raw) {
        Ok(file) => file,
        Err(e) => {
            warn!(error = %e, "Failed to parse store file; treating as no history");
            return Ok(None);
        }
    };

    if file.is_legacy() {
        info!("Store file uses the legacy bare-array shape; migrating in place");
        let videos = file.into_videos();
        let migrated = VideoStore {
            last_updated: Utc::now(),
            videos,
        };
        write_store(path, &migrated).await?;
        return Ok(migrated.videos.first().map(|v| v.link.clone()));
    }

    Ok(file.into_videos().first().map(|v| v.link.clone()))
}

/// Merge newly discovered videos into the store and rewrite it.
///
/// Re-reads the current store (tolerating both shapes), drops any new record
/// whose link is already stored, prepends the remainder in their original
/// discovery order, and fully overwrites the file with a fresh
/// `last_updated` timestamp.
///
/// # Returns
///
/// The number of records actually added.
///
/// # Errors
///
/// A store file that exists but cannot be read or parsed aborts the merge
/// without writing, so a transiently corrupt file never loses history.
#[instrument(level = "info", skip_all, fields(path = %path.display(), candidates = new_records.len()))]
pub async fn merge_and_persist(
    path: &Path,
    new_records: Vec<VideoRecord>,
) -> Result<usize, Box<dyn Error>> {
    let existing = match fs::read_to_string(path).await {
        Ok(raw) => serde_json::from_str::<StoreFile>(&raw)
            .map_err(|e| format!("store file {} is corrupt; aborting merge: {e}", path.display()))?
            .into_videos(),
        Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let existing_links: HashSet<&str> = existing.iter().map(|v| v.link.as_str()).collect();
    let unique_new: Vec<VideoRecord> = new_records
        .into_iter()
        .filter(|v| !existing_links.contains(v.link.as_str()))
        .unique_by(|v| v.link.clone())
        .collect();

    for video in &unique_new {
        info!(title = %video.title, link = %video.link, "New video");
    }

    let added = unique_new.len();
    let combined = unique_new.into_iter().chain(existing).collect::<Vec<_>>();
    write_store(
        path,
        &VideoStore {
            last_updated: Utc::now(),
            videos: combined,
        },
    )
    .await?;

    info!(added, "Added new videos at the beginning of the store");
    Ok(added)
}

/// Decide what a scrape outcome does to the store, and do it.
///
/// - Zero thumbnail elements is a scrape anomaly, not "zero new videos":
///   the store file is left byte-for-byte unchanged.
/// - An empty new set leaves the store untouched and logs the most recent
///   candidate for the "nothing new" case.
/// - A non-empty new set is merged via [`merge_and_persist`].
///
/// # Returns
///
/// The number of records added to the store (zero on both no-write paths).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn apply_scrape_outcome(
    path: &Path,
    outcome: ScrapeOutcome,
) -> Result<usize, Box<dyn Error>> {
    if outcome.thumbnail_count == 0 {
        error!("No video elements found on the page; store left untouched");
        return Ok(0);
    }

    if outcome.new_videos.is_empty() {
        match &outcome.most_recent_candidate {
            Some(video) => {
                info!(title = %video.title, link = %video.link, "No new videos found")
            }
            None => warn!("No thumbnail element could be extracted"),
        }
        return Ok(0);
    }

    merge_and_persist(path, outcome.new_videos).await
}

async fn write_store(path: &Path, store: &VideoStore) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(store)?;
    fs::write(path, json).await?;
    info!(path = %path.display(), videos = store.videos.len(), "Wrote store file");
    Ok(())
}
