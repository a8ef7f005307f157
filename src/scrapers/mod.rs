//! Channel listing scrapers.
//!
//! One submodule per video host. Each scraper drives a [`ChannelPage`]
//! capability through the same fixed sequence:
//!
//! 1. **Navigate** to the channel listing URL
//! 2. **Wait** for the video grid container, then scroll and settle so
//!    lazily rendered thumbnails populate
//! 3. **Extract** video records from the page HTML in DOM order (the
//!    host's "most recent first" ordering)
//! 4. **Early-stop** at the previously stored watermark link
//!
//! Extraction problems on a single thumbnail element are logged and the
//! element skipped; navigation and wait failures abort the scrape without
//! touching the store.
//!
//! [`ChannelPage`]: crate::browser::ChannelPage

pub mod rumble;
