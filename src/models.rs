//! Data models for the persisted video store.
//!
//! This module defines the core data structures:
//! - [`VideoRecord`]: Metadata for a single video discovered on the channel page
//! - [`VideoStore`]: The full on-disk record — a newest-first list of videos
//!   plus a last-write timestamp
//! - [`StoreFile`]: An untagged wrapper accepting both on-disk shapes (the
//!   current `{last_updated, videos}` object and the legacy bare array)
//!
//! A record's identity is its `link`; the store never holds two records with
//! the same link. Records are immutable once stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one video as extracted from the channel listing page.
///
/// # Fields
///
/// * `title` - The video title (image alt text on the listing page)
/// * `link` - Absolute URL of the video page; the record's unique key
/// * `thumbnail` - Thumbnail image URL, when one had loaded at scrape time
/// * `uploader` - Static attribution recorded on every video
/// * `uploaded_at` - Upload time derived from the listing's relative-date
///   text ("3 hours ago"); absent for records stored before this field
///   existed or when the listing exposed no date text
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VideoRecord {
    /// The video title.
    pub title: String,
    /// Absolute URL of the video page. Unique within a store.
    pub link: String,
    /// Thumbnail image URL, if the listing had one loaded.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Constant attribution for the channel owner.
    pub uploader: String,
    /// Approximate upload time parsed from the listing's relative-date text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// The persisted store: every video seen so far, newest first.
///
/// The JSON file is the sole durable owner of video history; the in-memory
/// value during a run is a transient working copy. `last_updated` is the
/// last *write* time — it is refreshed on every merge and migration write,
/// not only when new videos were found.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VideoStore {
    /// Time of the last write to the store file.
    pub last_updated: DateTime<Utc>,
    /// All known videos, newest first, unique by `link`.
    pub videos: Vec<VideoRecord>,
}

impl VideoStore {
    /// An empty store stamped with the given write time.
    pub fn empty(now: DateTime<Utc>) -> Self {
        VideoStore {
            last_updated: now,
            videos: Vec::new(),
        }
    }
}

/// Either on-disk shape of the store file.
///
/// The original store predates the `{last_updated, videos}` wrapper and was
/// a bare array of records. Both shapes are accepted on read; the legacy
/// shape is migrated to the current one the first time it is loaded.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StoreFile {
    /// Current shape: `{ "last_updated": ..., "videos": [...] }`.
    Current(VideoStore),
    /// Legacy shape: a bare array of records.
    Legacy(Vec<VideoRecord>),
}

impl StoreFile {
    /// Whether this file still uses the legacy bare-array shape.
    pub fn is_legacy(&self) -> bool {
        matches!(self, StoreFile::Legacy(_))
    }

    /// The video list, regardless of which shape was on disk.
    pub fn into_videos(self) -> Vec<VideoRecord> {
        match self {
            StoreFile::Current(store) => store.videos,
            StoreFile::Legacy(videos) => videos,
        }
    }
}
