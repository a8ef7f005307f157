//! Rumble channel listing scraper.
//!
//! Scrapes a channel's `/videos` listing page, e.g.
//! `https://rumble.com/c/BannonsWarRoom/videos`. Each video on the listing
//! is a thumbnail element inside the `ol.thumbnail__grid` container; the
//! title is the thumbnail image's alt text, the link is relative and is
//! resolved against the channel URL.
//!
//! # Early stop
//!
//! Enumeration proceeds in DOM order (newest first) and stops as soon as an
//! extracted link equals the stored watermark, so only videos strictly newer
//! than the watermark are reported. Without a watermark, or when the
//! watermark never matches, every extracted video is reported.

use crate::browser::ChannelPage;
use crate::dates::parse_relative_date_at;
use crate::models::VideoRecord;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// The video-list container; its presence means the listing has rendered.
pub const GRID_SELECTOR: &str = "ol.thumbnail__grid";

static THUMBS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ol.thumbnail__grid div.thumbnail__thumb").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img.thumbnail__image").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.videostream__link.link").unwrap());
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time").unwrap());

/// Scrape-time configuration, injected by the orchestrator.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// The channel listing URL; relative video links resolve against it.
    pub channel_url: Url,
    /// Attribution recorded on every extracted video.
    pub uploader: String,
    /// Vertical scroll offset (px) applied once the grid is present.
    pub scroll_offset: u32,
    /// Fixed delay after scrolling, for lazily rendered thumbnails.
    pub settle_delay: Duration,
}

/// What a scrape found.
#[derive(Debug)]
pub struct ScrapeOutcome {
    /// Videos strictly newer than the watermark, in discovery order.
    pub new_videos: Vec<VideoRecord>,
    /// The first successfully extracted video, new or not.
    pub most_recent_candidate: Option<VideoRecord>,
    /// How many thumbnail elements the listing contained. Zero is a scrape
    /// anomaly, not "zero new videos".
    pub thumbnail_count: usize,
}

/// Drive a [`ChannelPage`] through the full listing scrape.
///
/// Navigates to the channel URL, waits for the video grid, triggers the
/// lazy-load scroll, lets the page settle, then extracts video records from
/// the page HTML with the early-stop rule applied against `watermark`.
///
/// # Errors
///
/// Navigation and selector-wait failures propagate; the caller logs them
/// and aborts the run without touching the store.
#[instrument(level = "info", skip_all, fields(url = %config.channel_url))]
pub fn scrape(
    page: &dyn ChannelPage,
    config: &ChannelConfig,
    watermark: Option<&str>,
) -> Result<ScrapeOutcome, Box<dyn Error>> {
    page.navigate(config.channel_url.as_str())?;

    info!("Waiting for the video grid to load");
    page.wait_for_selector(GRID_SELECTOR)?;

    page.evaluate(&format!("window.scrollTo(0, {})", config.scroll_offset))?;
    page.wait(config.settle_delay);

    let html = page.content()?;
    Ok(collect_new(&html, config, watermark, Utc::now()))
}

/// Extract video records from listing HTML, stopping at the watermark.
///
/// Thumbnail elements are visited in DOM order. Elements missing a title or
/// link are logged and skipped without ending the enumeration. The first
/// successfully extracted record becomes `most_recent_candidate` whether or
/// not it is new.
pub fn collect_new(
    html: &str,
    config: &ChannelConfig,
    watermark: Option<&str>,
    now: DateTime<Utc>,
) -> ScrapeOutcome {
    let document = Html::parse_document(html);
    let thumbs: Vec<ElementRef> = document.select(&THUMBS).collect();
    info!(count = thumbs.len(), "Found video elements on this page");

    let mut new_videos = Vec::new();
    let mut most_recent_candidate = None;
    for thumb in &thumbs {
        let Some(record) = extract_video(thumb, config, now) else {
            continue;
        };
        if most_recent_candidate.is_none() {
            most_recent_candidate = Some(record.clone());
        }
        if watermark.is_some_and(|w| w == record.link) {
            info!(title = %record.title, link = %record.link, "Reached the most recently stored video");
            break;
        }
        debug!(title = %record.title, link = %record.link, "Extracted new video");
        new_videos.push(record);
    }

    ScrapeOutcome {
        new_videos,
        most_recent_candidate,
        thumbnail_count: thumbs.len(),
    }
}

/// Extract one record from a thumbnail element, or skip it with a log line.
fn extract_video(
    thumb: &ElementRef,
    config: &ChannelConfig,
    now: DateTime<Utc>,
) -> Option<VideoRecord> {
    let image = thumb.select(&IMAGE).next();
    let title = image.and_then(|img| img.value().attr("alt"));
    let thumbnail = image.and_then(|img| img.value().attr("src"));
    let href = thumb
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"));

    let (Some(title), Some(href)) = (title, href) else {
        warn!(
            has_title = title.is_some(),
            has_link = href.is_some(),
            "Skipping thumbnail element with missing fields"
        );
        return None;
    };

    let link = match config.channel_url.join(href) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            warn!(%href, error = %e, "Skipping thumbnail element with unresolvable link");
            return None;
        }
    };

    let uploaded_at = thumb
        .select(&TIME)
        .next()
        .map(|t| t.text().collect::<String>())
        .map(|text| parse_relative_date_at(text.trim(), now));

    Some(VideoRecord {
        title: title.trim().to_string(),
        link,
        thumbnail: thumbnail.map(|s| s.to_string()),
        uploader: config.uploader.clone(),
        uploaded_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;
    use std::fmt::Write;

    fn config() -> ChannelConfig {
        ChannelConfig {
            channel_url: Url::parse("https://rumble.com/c/BannonsWarRoom/videos").unwrap(),
            uploader: "https://warroom.org".to_string(),
            scroll_offset: 500,
            settle_delay: Duration::from_millis(1),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 6, 14, 0, 0).unwrap()
    }

    /// A listing page with one thumbnail element per (title, href, ago) entry.
    fn listing(entries: &[(&str, &str, Option<&str>)]) -> String {
        let mut html = String::from("<html><body><ol class=\"thumbnail__grid\">");
        for (title, href, ago) in entries {
            write!(
                html,
                "<div class=\"thumbnail__thumb\">\
                 <a class=\"videostream__link link\" href=\"{href}\">\
                 <img class=\"thumbnail__image\" alt=\"{title}\" src=\"https://i.rmbl.ws{href}.jpg\">\
                 </a>"
            )
            .unwrap();
            if let Some(ago) = ago {
                write!(html, "<time>{ago}</time>").unwrap();
            }
            html.push_str("</div>");
        }
        html.push_str("</ol></body></html>");
        html
    }

    #[test]
    fn test_extracts_in_dom_order_with_absolute_links() {
        let html = listing(&[
            ("Episode 102", "/v102.html", Some("3 hours ago")),
            ("Episode 101", "/v101.html", Some("5 hours ago")),
        ]);

        let outcome = collect_new(&html, &config(), None, now());
        assert_eq!(outcome.thumbnail_count, 2);
        assert_eq!(outcome.new_videos.len(), 2);
        assert_eq!(outcome.new_videos[0].title, "Episode 102");
        assert_eq!(outcome.new_videos[0].link, "https://rumble.com/v102.html");
        assert_eq!(
            outcome.new_videos[0].thumbnail.as_deref(),
            Some("https://i.rmbl.ws/v102.html.jpg")
        );
        assert_eq!(outcome.new_videos[0].uploader, "https://warroom.org");
        assert_eq!(
            outcome.new_videos[0].uploaded_at,
            Some(now() - chrono::Duration::hours(3))
        );
        assert_eq!(outcome.new_videos[1].link, "https://rumble.com/v101.html");
    }

    #[test]
    fn test_early_stop_at_watermark() {
        let html = listing(&[
            ("N1", "/n1.html", None),
            ("N2", "/n2.html", None),
            ("L", "/l.html", None),
            ("O1", "/o1.html", None),
            ("O2", "/o2.html", None),
        ]);

        let outcome = collect_new(&html, &config(), Some("https://rumble.com/l.html"), now());
        let links: Vec<&str> = outcome.new_videos.iter().map(|v| v.link.as_str()).collect();
        assert_eq!(links, vec!["https://rumble.com/n1.html", "https://rumble.com/n2.html"]);
        assert_eq!(outcome.thumbnail_count, 5);
    }

    #[test]
    fn test_watermark_at_top_means_no_new_videos() {
        let html = listing(&[("L", "/l.html", None), ("O1", "/o1.html", None)]);

        let outcome = collect_new(&html, &config(), Some("https://rumble.com/l.html"), now());
        assert!(outcome.new_videos.is_empty());
        // The candidate is still recorded even though it is not new.
        assert_eq!(
            outcome.most_recent_candidate.as_ref().map(|v| v.link.as_str()),
            Some("https://rumble.com/l.html")
        );
    }

    #[test]
    fn test_unmatched_watermark_exhausts_the_listing() {
        let html = listing(&[("A", "/a.html", None), ("B", "/b.html", None)]);

        let outcome = collect_new(&html, &config(), Some("https://rumble.com/gone.html"), now());
        assert_eq!(outcome.new_videos.len(), 2);
    }

    #[test]
    fn test_skips_thumbs_missing_fields() {
        let mut html = String::from("<html><body><ol class=\"thumbnail__grid\">");
        // No link element at all.
        html.push_str(
            "<div class=\"thumbnail__thumb\">\
             <img class=\"thumbnail__image\" alt=\"Broken\" src=\"https://i.rmbl.ws/x.jpg\">\
             </div>",
        );
        // No image, so no title either.
        html.push_str(
            "<div class=\"thumbnail__thumb\">\
             <a class=\"videostream__link link\" href=\"/untitled.html\"></a>\
             </div>",
        );
        // Intact.
        html.push_str(
            "<div class=\"thumbnail__thumb\">\
             <a class=\"videostream__link link\" href=\"/good.html\">\
             <img class=\"thumbnail__image\" alt=\"Good\" src=\"https://i.rmbl.ws/good.jpg\">\
             </a></div>",
        );
        html.push_str("</ol></body></html>");

        let outcome = collect_new(&html, &config(), None, now());
        assert_eq!(outcome.thumbnail_count, 3);
        assert_eq!(outcome.new_videos.len(), 1);
        assert_eq!(outcome.new_videos[0].title, "Good");
        // The skipped elements never became the candidate.
        assert_eq!(
            outcome.most_recent_candidate.as_ref().map(|v| v.title.as_str()),
            Some("Good")
        );
    }

    #[test]
    fn test_missing_time_leaves_uploaded_at_unset() {
        let html = listing(&[("No date", "/nd.html", None)]);
        let outcome = collect_new(&html, &config(), None, now());
        assert_eq!(outcome.new_videos[0].uploaded_at, None);
    }

    #[test]
    fn test_empty_grid() {
        let html = "<html><body><ol class=\"thumbnail__grid\"></ol></body></html>";
        let outcome = collect_new(html, &config(), None, now());
        assert_eq!(outcome.thumbnail_count, 0);
        assert!(outcome.new_videos.is_empty());
        assert!(outcome.most_recent_candidate.is_none());
    }

    /// In-memory [`ChannelPage`] returning canned HTML and recording calls.
    struct FakePage {
        html: String,
        navigations: RefCell<Vec<String>>,
        waited_selectors: RefCell<Vec<String>>,
        scripts: RefCell<Vec<String>>,
        sleeps: RefCell<Vec<Duration>>,
    }

    impl FakePage {
        fn new(html: String) -> Self {
            FakePage {
                html,
                navigations: RefCell::new(Vec::new()),
                waited_selectors: RefCell::new(Vec::new()),
                scripts: RefCell::new(Vec::new()),
                sleeps: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChannelPage for FakePage {
        fn navigate(&self, url: &str) -> Result<(), Box<dyn Error>> {
            self.navigations.borrow_mut().push(url.to_string());
            Ok(())
        }

        fn wait_for_selector(&self, selector: &str) -> Result<(), Box<dyn Error>> {
            self.waited_selectors.borrow_mut().push(selector.to_string());
            Ok(())
        }

        fn evaluate(&self, script: &str) -> Result<(), Box<dyn Error>> {
            self.scripts.borrow_mut().push(script.to_string());
            Ok(())
        }

        fn wait(&self, duration: Duration) {
            self.sleeps.borrow_mut().push(duration);
        }

        fn content(&self) -> Result<String, Box<dyn Error>> {
            Ok(self.html.clone())
        }
    }

    #[test]
    fn test_scrape_drives_the_page_and_honors_the_watermark() {
        let html = listing(&[
            ("New", "/new.html", Some("2 hours ago")),
            ("Seen", "/seen.html", Some("1 day ago")),
        ]);
        let page = FakePage::new(html);

        let outcome = scrape(&page, &config(), Some("https://rumble.com/seen.html")).unwrap();

        assert_eq!(
            *page.navigations.borrow(),
            ["https://rumble.com/c/BannonsWarRoom/videos"]
        );
        assert_eq!(*page.waited_selectors.borrow(), [GRID_SELECTOR]);
        assert_eq!(*page.scripts.borrow(), ["window.scrollTo(0, 500)"]);
        assert_eq!(*page.sleeps.borrow(), [Duration::from_millis(1)]);

        assert_eq!(outcome.new_videos.len(), 1);
        assert_eq!(outcome.new_videos[0].link, "https://rumble.com/new.html");
    }

    struct FailingPage;

    impl ChannelPage for FailingPage {
        fn navigate(&self, _url: &str) -> Result<(), Box<dyn Error>> {
            Err("navigation timed out".into())
        }

        fn wait_for_selector(&self, _selector: &str) -> Result<(), Box<dyn Error>> {
            unreachable!("navigation already failed")
        }

        fn evaluate(&self, _script: &str) -> Result<(), Box<dyn Error>> {
            unreachable!()
        }

        fn wait(&self, _duration: Duration) {}

        fn content(&self) -> Result<String, Box<dyn Error>> {
            unreachable!()
        }
    }

    #[test]
    fn test_navigation_failure_propagates() {
        let result = scrape(&FailingPage, &config(), None);
        assert!(result.is_err());
    }
}
